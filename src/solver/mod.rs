//! Exact nodal-analysis solver.
//!
//! This module turns a branch list into node voltages and branch currents.
//!
//! ## Nodal Analysis
//!
//! One unknown per non-ground node, ground fixed at 0 V. The system
//! `A·v = z` is assembled row by row:
//!
//! ```text
//! plain node       Σ g·(V(n) - V(far)) = Σ injected current
//! source terminal  V(start) - V(end)   = E
//! supernode root   KCL summed over the whole voltage-source cluster
//! ```
//!
//! Every coefficient is a [`Scalar`](crate::circuit::Scalar), so
//! elimination is exact and two solves of the same circuit give identical
//! results.
//!
//! Voltage-source currents are not unknowns of the system; they are
//! recovered after the solve by [`CurrentEvaluator`].

mod analysis;
mod assembler;
mod current;
mod matrix;
mod supernode;

pub use analysis::{solve, DcAnalysis, Solution};
pub use assembler::{assemble, pin_voltage_sources};
pub use current::CurrentEvaluator;
pub use matrix::AugmentedMatrix;
pub use supernode::{KclTerms, SupernodeResolver};
