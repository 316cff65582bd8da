//! # Nodal Core
//!
//! Exact nodal analysis of resistive DC circuits.
//!
//! This library provides:
//! - A line-oriented command language for entering circuits branch by branch
//! - Nodal analysis with supernodes for (chains of) ideal voltage sources
//! - Exact rational arithmetic, so results are reproducible to the last digit
//! - An interactive console for querying voltages and currents (CLI only)
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for branch lines, value suffixes and console commands
//! - [`circuit`] - Editable circuit, finalized branches and topology index
//! - [`solver`] - Equation assembly, exact elimination and branch currents
//! - `repl` - Interactive console (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! nodal divider.txt
//! ```
//!
//! ### Library
//!
//! ```
//! use nodal_core::{circuit::Scalar, dsl, Circuit, DcAnalysis};
//!
//! let mut circuit = Circuit::new();
//! circuit.import(dsl::parse_netlist("A V1=10 GND\nA R1=5 GND\n")?)?;
//!
//! let analysis = DcAnalysis::run(circuit.netlist()?)?;
//! assert_eq!(analysis.current_through("R1")?, Scalar::from_integer(2.into()));
//! # Ok::<(), nodal_core::NodalError>(())
//! ```
//!
//! ## Analysis Method
//!
//! Every non-ground node gets one equation:
//!
//! 1. Plain nodes balance the currents through their resistors and current sources
//! 2. Nodes behind a voltage source take its constraint `V(start) - V(end) = E`
//! 3. Each cluster of nodes joined by sources, if not tied to ground, gets one
//!    KCL balance over the whole cluster (the supernode)
//!
//! The system is reduced exactly; voltage-source currents are recovered
//! afterwards from KCL on the side of the source away from ground.

pub mod circuit;
pub mod dsl;
pub mod error;
pub mod solver;

#[cfg(feature = "cli")]
pub mod repl;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{NodalError, Result};
pub use solver::DcAnalysis;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmDcSolver;
