//! WASM bindings for Nodal Core.
//!
//! Solves a netlist once and answers voltage and current queries from
//! JavaScript. Values cross the boundary as `f64`.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmDcSolver } from 'nodal_core';
//!
//! await init();
//!
//! const netlist = `
//!   IN V1=10 GND
//!   IN R1=4.7k OUT
//!   OUT R2=10k GND
//! `;
//!
//! const solver = new WasmDcSolver(netlist);
//! solver.voltage("OUT");   // 6.802721...
//! solver.current("R1");    // 0.000680...
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::Circuit;
use crate::dsl;
use crate::error::NodalError;
use crate::solver::DcAnalysis;

fn js_error(err: NodalError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_f64(value: &crate::circuit::Scalar) -> f64 {
    num_traits::ToPrimitive::to_f64(value).unwrap_or(f64::NAN)
}

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// A solved DC circuit.
#[wasm_bindgen]
pub struct WasmDcSolver {
    analysis: DcAnalysis,
}

#[wasm_bindgen]
impl WasmDcSolver {
    /// Parse and solve a netlist (one branch or `COMP=VALUE` per line).
    ///
    /// # Returns
    /// A solved circuit, or an error message if the netlist is invalid or
    /// the circuit has no unique solution.
    #[wasm_bindgen(constructor)]
    pub fn new(netlist: &str) -> Result<WasmDcSolver, JsValue> {
        let statements = dsl::parse_netlist(netlist).map_err(js_error)?;

        let mut circuit = Circuit::new();
        circuit.import(statements).map_err(js_error)?;

        let branches = circuit.netlist().map_err(js_error)?;
        let analysis = DcAnalysis::run(branches).map_err(js_error)?;

        Ok(WasmDcSolver { analysis })
    }

    /// Voltage of a node (`GND` is 0), or across a component.
    #[wasm_bindgen]
    pub fn voltage(&self, name: &str) -> Result<f64, JsValue> {
        let value = match self.analysis.voltage(name) {
            Err(NodalError::UnknownNode { .. }) => self.analysis.voltage_across(name),
            other => other,
        };
        value.map(|v| to_f64(&v)).map_err(js_error)
    }

    /// Current through a component.
    #[wasm_bindgen]
    pub fn current(&self, component: &str) -> Result<f64, JsValue> {
        self.analysis
            .current_through(component)
            .map(|v| to_f64(&v))
            .map_err(js_error)
    }

    /// Names of the solved (non-ground) nodes.
    #[wasm_bindgen]
    pub fn node_names(&self) -> Vec<String> {
        self.analysis.solution().nodes().to_vec()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
