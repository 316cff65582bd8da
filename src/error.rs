//! Error types for the nodal analysis engine and its console.
//!
//! This module provides a unified error type [`NodalError`] that covers
//! command parsing, circuit editing, equation solving and result queries.
//!
//! Errors fall into the classes of the engine's error policy:
//! - structural errors ([`NodalError::is_structural`]) abort a whole solve,
//! - lookup errors ([`NodalError::is_lookup`]) only affect a single query,
//! - value errors ([`NodalError::is_value`]) are caught before assembly.

use thiserror::Error;

/// Result type alias using [`NodalError`].
pub type Result<T> = std::result::Result<T, NodalError>;

/// Unified error type for all nodal operations.
#[derive(Error, Debug)]
pub enum NodalError {
    // ============ Parsing Errors ============
    /// Error while parsing a command or netlist line
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Component id that does not name a resistor, voltage or current source
    #[error("Invalid component '{name}': {message}")]
    InvalidComponent { name: String, message: String },

    /// Numeric value that could not be read
    #[error("Invalid value '{text}'")]
    InvalidValue { text: String },

    // ============ Circuit Editing Errors ============
    /// Component id already used by another branch
    #[error("Component {name} already exists")]
    DuplicateComponent { name: String },

    /// Component already carries a value (use EDIT to change it)
    #[error("Component {name} already has a value, use EDIT to change it")]
    ValueAlreadyAssigned { name: String },

    /// Branch number outside the branch list
    #[error("Branch {number} does not exist")]
    BranchNotFound { number: usize },

    // ============ Structural Errors ============
    /// The nodal system has no unique solution
    #[error("Singular system - circuit may have a floating node, no ground reference or conflicting voltage sources")]
    SingularSystem,

    /// A loop made only of voltage sources
    #[error("Voltage source '{component}' closes a loop of voltage sources")]
    VoltageLoop { component: String },

    // ============ Lookup Errors ============
    /// Component id not present in the circuit
    #[error("Unknown component '{name}'")]
    UnknownComponent { name: String },

    /// Node name not present in the circuit
    #[error("Unknown node '{node}'")]
    UnknownNode { node: String },

    // ============ Value Errors ============
    /// Resistor of zero ohms or a component without a value
    #[error("Component '{component}' {reason}")]
    ZeroValuedComponent {
        component: String,
        reason: &'static str,
    },

    // ============ I/O Errors ============
    /// Error reading a netlist file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error reading from or writing to the console
    #[error("Console error: {message}")]
    ConsoleError { message: String },
}

impl NodalError {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an unknown component error
    pub fn unknown_component(name: impl Into<String>) -> Self {
        Self::UnknownComponent { name: name.into() }
    }

    /// Create an unknown node error
    pub fn unknown_node(node: impl Into<String>) -> Self {
        Self::UnknownNode { node: node.into() }
    }

    /// Create a zero valued component error
    pub fn zero_valued(component: impl Into<String>, reason: &'static str) -> Self {
        Self::ZeroValuedComponent {
            component: component.into(),
            reason,
        }
    }

    /// Create a console error from an I/O failure
    pub fn console(err: std::io::Error) -> Self {
        Self::ConsoleError {
            message: err.to_string(),
        }
    }

    /// The circuit as a whole cannot be solved.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::SingularSystem | Self::VoltageLoop { .. })
    }

    /// A single query named something the circuit does not contain.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::UnknownComponent { .. } | Self::UnknownNode { .. })
    }

    /// A component value makes the circuit unusable.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::ZeroValuedComponent { .. })
    }
}
