//! Command language for entering circuits.
//!
//! Circuits are typed one branch per line, either at the console or in a
//! netlist file. The language is line-oriented and case-insensitive except
//! for value suffixes (`M` is mega, `m` is milli).
//!
//! # Grammar Overview
//!
//! ```text
//! line        = command | statement | comment | empty
//! statement   = branch | assignment
//! branch      = node component ['=' value] node
//! assignment  = component '=' value
//! comment     = ('#' | ';') { any_char }          (netlist files only)
//!
//! command     = "HELP" | "NEW" | "CLEAR" | "CLS" | "END" | "EXIT"
//!             | "IMPORT" path
//!             | "PRINT" ("BRANCHES" | "COMPONENTS")
//!             | "EDIT" assignment
//!             | "EDIT" "BRANCH" number
//!             | "RETURN" ("V" | "I") '(' (name | "ALL") ')'
//!
//! node        = (letter | digit | '_')+           ("GND" is ground)
//! component   = ('R' | 'V' | 'I') digit+
//! value       = ['+'|'-'] digits ['.' digits] [('e'|'E') ['+'|'-'] digits] [suffix]
//! suffix      = 'T' | 'G' | 'M' | "MEG" | "Meg" | 'K' | 'k' | 'm' | 'u' | 'µ' | 'n' | 'p'
//! ```
//!
//! # Component Types
//!
//! | Type | Description | Unit |
//! |------|-------------|------|
//! | R | Resistor | ohms |
//! | V | Ideal DC voltage source, start node positive | volts |
//! | I | Ideal DC current source, delivers its value out of the start node | amperes |
//!
//! # Example
//!
//! ```text
//! # Voltage divider
//! IN V1=10 GND
//! IN R1=4.7k OUT
//! OUT R2 GND
//! R2=10k
//! ```

mod ast;
mod parser;
mod value;

pub use ast::*;
pub use parser::{parse_command, parse_statement};
pub use value::{parse_value, require_value, MAX_EXPONENT};

use crate::error::Result;

/// Parse a netlist: one statement per line, `#` and `;` start comment lines.
///
/// Fails on the first bad line with its 1-based line number.
pub fn parse_netlist(input: &str) -> Result<Vec<Statement>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, text)| {
            let text = text.trim();
            !(text.is_empty() || text.starts_with('#') || text.starts_with(';'))
        })
        .map(|(i, text)| parse_statement(text, i + 1))
        .collect()
}

/// Read a netlist file.
#[cfg(feature = "cli")]
pub fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| crate::error::NodalError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}
