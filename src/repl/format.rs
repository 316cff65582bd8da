//! Console formatting: colours, engineering notation and listings.

use crossterm::style::Stylize;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::circuit::{Circuit, ComponentKind, Connection, Scalar};

/// Width of the horizontal rules and boxes.
pub const RULE_WIDTH: usize = 80;

/// Significant digits in short engineering notation.
const SHORT_DIGITS: usize = 4;

/// Suffix exponents, from tera down to pico.
const MAX_SUFFIX_EXPONENT: i32 = 12;

/// Applies the console palette, or nothing when colour is off.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Whether ANSI styling is emitted.
    pub fn color(&self) -> bool {
        self.color
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, |t| t.red().bold().to_string())
    }

    pub fn result(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().bold().to_string())
    }

    pub fn echo(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().bold().to_string())
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(text, |t| t.blue().bold().to_string())
    }

    pub fn banner(&self, text: &str) -> String {
        self.paint(text, |t| t.green().bold().to_string())
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.color {
            style(text)
        } else {
            text.to_string()
        }
    }
}

/// Convert an exact value for display.
pub fn to_f64(value: &Scalar) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Scale a value into [1, 1000) by powers of 1000, within tera..pico.
fn scale(value: f64) -> (f64, i32) {
    let mut exponent = 0;
    let mut scaled = value;
    while scaled.abs() >= 1000.0 && exponent < MAX_SUFFIX_EXPONENT {
        exponent += 3;
        scaled = value / 10f64.powi(exponent);
    }
    while scaled != 0.0 && scaled.abs() < 1.0 && exponent > -MAX_SUFFIX_EXPONENT {
        exponent -= 3;
        scaled = value / 10f64.powi(exponent);
    }
    (scaled, exponent)
}

fn suffix(exponent: i32) -> &'static str {
    match exponent {
        12 => "T",
        9 => "G",
        6 => "M",
        3 => "k",
        -3 => "m",
        -6 => "u",
        -9 => "n",
        -12 => "p",
        _ => "",
    }
}

/// Scientific notation computed from the exact value, e.g. `1.000e312`.
///
/// Used for values beyond the `f64` range, where scaling yields infinity.
fn scientific(value: &Scalar, decimals: usize) -> String {
    let digits = |n: &BigInt| n.magnitude().to_string().len() as i32;
    let mut exponent = digits(value.numer()) - digits(value.denom());
    let power = Scalar::from_integer(BigInt::from(10).pow(exponent.unsigned_abs()));
    let shifted = if exponent >= 0 {
        value.clone() / power
    } else {
        value.clone() * power
    };
    let mut mantissa = to_f64(&shifted);
    if mantissa.abs() < 1.0 {
        mantissa *= 10.0;
        exponent -= 1;
    }
    format!("{mantissa:.decimals$}e{exponent}")
}

/// Engineering notation with a fixed number of decimals, e.g. `4.700000k`.
pub fn engineering(value: &Scalar, precision: usize) -> String {
    let (scaled, exponent) = scale(to_f64(value));
    if !scaled.is_finite() {
        return scientific(value, precision);
    }
    format!("{scaled:.precision$}{}", suffix(exponent))
}

/// Engineering notation with four significant digits, e.g. `4.700k`.
pub fn engineering_short(value: &Scalar) -> String {
    let (scaled, exponent) = scale(to_f64(value));
    if !scaled.is_finite() {
        return scientific(value, SHORT_DIGITS - 1);
    }
    let integer_digits = if scaled.abs() < 1.0 {
        1
    } else {
        scaled.abs().log10().floor() as usize + 1
    };
    let decimals = SHORT_DIGITS.saturating_sub(integer_digits).max(1);
    format!("{scaled:.decimals$}{}", suffix(exponent))
}

/// `V(A) = 10.000000 VOLTS`
pub fn quantity_line(symbol: char, name: &str, value: &Scalar, unit: &str, precision: usize) -> String {
    format!("{symbol}({name}) = {} {unit}", engineering(value, precision))
}

/// One branch as `A R1=10.00k B`, or `A R1 B` without a value.
pub fn branch_text(connection: &Connection, value: Option<&Scalar>) -> String {
    match value {
        Some(v) => format!(
            "{} {}={} {}",
            connection.start,
            connection.id,
            engineering_short(v),
            connection.end
        ),
        None => format!("{} {} {}", connection.start, connection.id, connection.end),
    }
}

/// Numbered box of all branches.
pub fn branch_table(circuit: &Circuit) -> Vec<String> {
    let inner = 34;
    let mut lines = vec![
        format!("┌─────┬{}┐", "─".repeat(inner)),
        format!("│ NUM │ {:<width$}│", "BRANCHES", width = inner - 1),
        format!("├─────┼{}┤", "─".repeat(inner)),
    ];
    for (i, connection) in circuit.connections().iter().enumerate() {
        let text = branch_text(connection, circuit.value(&connection.id));
        lines.push(format!("│ {:>3} │ {:<width$}│", i + 1, text, width = inner - 1));
    }
    lines.push(format!("└─────┴{}┘", "─".repeat(inner)));
    lines
}

/// Every component with its value, if any.
pub fn component_list(circuit: &Circuit) -> Vec<String> {
    circuit
        .components()
        .iter()
        .map(|entry| match &entry.value {
            Some(v) => format!("{}={}", entry.id, engineering_short(v)),
            None => entry.id.clone(),
        })
        .collect()
}

/// Frame file contents the way IMPORT echoes them.
pub fn boxed(title: &str, body: &str) -> Vec<String> {
    let inner = RULE_WIDTH - 2;
    let mut lines = vec![title.to_string(), format!("┌{}┐", "─".repeat(inner))];
    for line in body.lines() {
        lines.push(format!("│{:<inner$}│", line));
    }
    lines.push(format!("└{}┘", "─".repeat(inner)));
    lines
}

pub fn rule() -> String {
    "─".repeat(RULE_WIDTH)
}

pub fn banner_lines() -> Vec<String> {
    vec![
        String::new(),
        "Running nodal circuit analysis!".to_string(),
        String::new(),
        "Enter branches below or import a netlist file.".to_string(),
        "All data is lost when the session ends.".to_string(),
        "Type HELP for help.".to_string(),
        String::new(),
        rule(),
    ]
}

fn kind_help(kind: ComponentKind, letter: char, note: &str) -> String {
    format!(
        "> {letter}\t{kind}, value in {}.\n\t{note}\n\tFormat: {letter}[#]=[value]\n",
        kind.unit().to_lowercase()
    )
}

pub fn help_text() -> String {
    let mut text = String::new();
    text.push_str(&rule());
    text.push_str("\nHelp:\n\n");
    text.push_str("Solves DC circuits made of resistors and ideal sources.\n");
    text.push_str("Enter each branch or command on a new line.\n\n");
    text.push_str("Input syntax:\n\n");
    text.push_str("\t[START NODE] [COMPONENT][#]=[VALUE] [END NODE]\tExample: A R1=10k B\n");
    text.push_str("\t[START NODE] [COMPONENT][#] [END NODE]\t\tExample: A R1 B\n");
    text.push_str("\t[COMPONENT][#]=[VALUE]\t\t\t\tExample: R1=10k\n\n");
    text.push_str("\tNode and component names are not case sensitive.\n");
    text.push_str("\tValues take engineering suffixes: T G M/MEG k m u n p.\n");
    text.push_str("\tUse node name GND for the reference ground (0 V).\n\n");
    text.push_str("Components:\n\n");
    text.push_str(&kind_help(ComponentKind::Resistor, 'R', "DC resistance."));
    text.push_str(&kind_help(
        ComponentKind::VoltageSource,
        'V',
        "The start node is the positive terminal.",
    ));
    text.push_str(&kind_help(
        ComponentKind::CurrentSource,
        'I',
        "Delivers its current out of the start node.",
    ));
    text.push_str("\nCommands:\n\n");
    text.push_str("> CLEAR, CLS\t\tClear the screen.\n");
    text.push_str("> EDIT [COMP]=[VALUE]\tChange a component value.\n");
    text.push_str("> EDIT BRANCH [NUM]\tReplace a branch; enter the new branch on the next line.\n");
    text.push_str("> END, EXIT\t\tLeave the session.\n");
    text.push_str("> HELP\t\t\tPrint this help.\n");
    text.push_str("> IMPORT [FILE]\t\tRead branches and values from a text file.\n");
    text.push_str("> NEW\t\t\tForget every branch and component.\n");
    text.push_str("> PRINT BRANCHES\tList branches with their numbers.\n");
    text.push_str("> PRINT COMPONENTS\tList components and values.\n");
    text.push_str("> RETURN V([NODE|COMP|ALL])\tNode voltage or voltage across a component.\n");
    text.push_str("> RETURN I([COMP|ALL])\tCurrent through a component.\n");
    text.push_str(&rule());
    text
}
