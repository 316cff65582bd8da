//! Circuit representation.
//!
//! This module provides the editable [`Circuit`] a session builds up, the
//! finalized [`Branch`] list handed to the solver, and the [`Topology`]
//! index mapping each node to the branches that start and end there.

mod branch;
mod graph;
mod topology;
mod types;
mod validate;

pub use branch::Branch;
pub use graph::{Circuit, ComponentEntry, Connection};
pub use topology::{Terminal, Topology};
pub use types::*;
pub use validate::validate_branches;
