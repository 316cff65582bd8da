//! Syntax tree types for console commands and netlist lines.

use crate::circuit::Scalar;

/// A branch description: `START COMP[=VALUE] END`.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchDef {
    /// Start node (positive terminal for sources)
    pub start: String,
    /// Component id
    pub id: String,
    /// End node
    pub end: String,
    /// Value given inline, if any
    pub value: Option<Scalar>,
}

/// A component value entered on its own: `COMP=VALUE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Component id
    pub id: String,
    /// Value in ohms, volts or amperes
    pub value: Scalar,
}

/// A line that changes the circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Add a branch
    Branch(BranchDef),
    /// Assign a component value
    Assign(Assignment),
}

/// The quantity requested by `RETURN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// `V(...)`
    Voltage,
    /// `I(...)`
    Current,
}

/// What a query applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `ALL`
    All,
    /// A node or component name
    Name(String),
}

/// A `RETURN` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub quantity: Quantity,
    pub target: Target,
}

/// What `PRINT` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintTarget {
    Branches,
    Components,
}

/// One console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Blank line
    Empty,
    /// `HELP`
    Help,
    /// `NEW`: forget the circuit
    New,
    /// `CLEAR` / `CLS`: clear the screen
    Clear,
    /// `END` / `EXIT`
    Exit,
    /// `IMPORT <file>`
    Import(String),
    /// `PRINT BRANCHES` / `PRINT COMPONENTS`
    Print(PrintTarget),
    /// `EDIT <id>=<value>`
    Edit(Assignment),
    /// `EDIT BRANCH <n>`; the replacement follows on the next line
    EditBranch(usize),
    /// `RETURN V(...)` / `RETURN I(...)`
    Return(Query),
    /// A branch line or value assignment
    Statement(Statement),
}
