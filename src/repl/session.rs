//! The circuit being edited plus its cached analysis.

use crate::circuit::Circuit;
use crate::dsl::Statement;
use crate::error::Result;
use crate::solver::DcAnalysis;

/// Session state: the circuit and the last analysis of it.
///
/// The analysis is keyed by the circuit revision, so any edit makes the next
/// query solve again.
#[derive(Debug, Default)]
pub struct Session {
    circuit: Circuit,
    cache: Option<(u64, DcAnalysis)>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The circuit being edited.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Mutable access to the circuit; edits bump its revision.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    /// Apply one statement.
    pub fn apply(&mut self, statement: Statement) -> Result<()> {
        self.circuit.apply(statement)
    }

    /// Forget the circuit and any cached analysis.
    pub fn reset(&mut self) {
        self.circuit.clear();
        self.cache = None;
    }

    /// Whether the cached analysis matches the current circuit.
    pub fn is_fresh(&self) -> bool {
        matches!(&self.cache, Some((revision, _)) if *revision == self.circuit.revision())
    }

    /// Analysis of the current circuit, solving only if it changed.
    pub fn analysis(&mut self) -> Result<&DcAnalysis> {
        let revision = self.circuit.revision();
        let analysis = match self.cache.take() {
            Some((cached, analysis)) if cached == revision => analysis,
            _ => DcAnalysis::run(self.circuit.netlist()?)?,
        };
        Ok(&self.cache.insert((revision, analysis)).1)
    }
}
