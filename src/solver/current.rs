//! Branch currents from solved node voltages.

use std::collections::HashMap;

use num_traits::Zero;

use crate::circuit::{normalize_name, Branch, ComponentKind, Direction, Scalar, Terminal, Topology};
use crate::error::{NodalError, Result};

use super::supernode::{conductance, Visited};

/// Computes branch currents for one solved circuit.
///
/// Resistor currents follow Ohm's law and current sources report their own
/// value. A voltage source has no V/I relation, so its current is recovered
/// from KCL on one side of it: the net current leaving that side through all
/// other branches, following further voltage sources with the same
/// traversal the supernode resolver uses.
pub struct CurrentEvaluator<'a> {
    branches: &'a [Branch],
    topology: &'a Topology,
    voltages: &'a [Scalar],
    by_id: HashMap<&'a str, usize>,
}

impl<'a> CurrentEvaluator<'a> {
    /// Create an evaluator; `voltages` is indexed like `topology`'s nodes.
    pub fn new(branches: &'a [Branch], topology: &'a Topology, voltages: &'a [Scalar]) -> Self {
        let by_id = branches
            .iter()
            .enumerate()
            .map(|(b, branch)| (branch.id.as_str(), b))
            .collect();
        Self {
            branches,
            topology,
            voltages,
            by_id,
        }
    }

    fn branch_index(&self, id: &str) -> Result<usize> {
        let id = normalize_name(id);
        self.by_id
            .get(id.as_str())
            .copied()
            .ok_or_else(|| NodalError::unknown_component(id))
    }

    fn voltage(&self, terminal: Terminal) -> Scalar {
        match terminal {
            Terminal::Ground => Scalar::zero(),
            Terminal::Node(i) => self.voltages[i].clone(),
        }
    }

    /// Current through a component.
    ///
    /// Measured from start node to end node, except for a current source,
    /// which reports its value (the current it delivers out of its start node).
    pub fn current_through(&self, id: &str) -> Result<Scalar> {
        let b = self.branch_index(id)?;
        self.branch_current(b)
    }

    /// Voltage across a component, `V(start) - V(end)`.
    pub fn voltage_across(&self, id: &str) -> Result<Scalar> {
        let b = self.branch_index(id)?;
        let (start, end) = self.topology.ends(b);
        Ok(self.voltage(start) - self.voltage(end))
    }

    /// Net current leaving a non-ground node through all its branches.
    ///
    /// Zero for every node of a solved circuit.
    pub fn net_current_leaving(&self, node: &str) -> Result<Scalar> {
        let name = normalize_name(node);
        let i = self
            .topology
            .node_index(&name)
            .ok_or_else(|| NodalError::unknown_node(name))?;

        let mut total = Scalar::zero();
        for (b, direction) in self.topology.incident(i) {
            total += self.leaving(b, direction)?;
        }
        Ok(total)
    }

    fn branch_current(&self, b: usize) -> Result<Scalar> {
        let branch = &self.branches[b];
        match branch.kind {
            ComponentKind::Resistor => {
                let (start, end) = self.topology.ends(b);
                Ok((self.voltage(start) - self.voltage(end)) * conductance(branch)?)
            }
            ComponentKind::CurrentSource => Ok(branch.value.clone()),
            ComponentKind::VoltageSource => self.source_current(b),
        }
    }

    /// Current flowing from start to end through a branch.
    fn flow(&self, b: usize) -> Result<Scalar> {
        let current = self.branch_current(b)?;
        match self.branches[b].kind {
            ComponentKind::CurrentSource => Ok(-current),
            _ => Ok(current),
        }
    }

    /// Current leaving the node on `direction`'s side through a branch.
    fn leaving(&self, b: usize, direction: Direction) -> Result<Scalar> {
        let flow = self.flow(b)?;
        Ok(match direction {
            Direction::Outgoing => flow,
            Direction::Incoming => -flow,
        })
    }

    fn source_current(&self, b: usize) -> Result<Scalar> {
        let (start, end) = self.topology.ends(b);

        // Balance the side that does not reach ground, preferring the start.
        if let Terminal::Node(p) = start {
            if !self.side_reaches_ground(p, b) {
                let mut visited = Visited::excluding(b);
                return Ok(-self.outflow(p, &mut visited)?);
            }
        }
        match end {
            Terminal::Node(m) => {
                let mut visited = Visited::excluding(b);
                self.outflow(m, &mut visited)
            }
            Terminal::Ground => Err(NodalError::VoltageLoop {
                component: self.branches[b].id.clone(),
            }),
        }
    }

    /// Net current leaving the voltage-source cluster behind `node`
    /// through every branch that is not a voltage source.
    fn outflow(&self, node: usize, visited: &mut Visited) -> Result<Scalar> {
        let mut total = Scalar::zero();
        if !visited.enter(node) {
            return Ok(total);
        }

        for (b, direction) in self.topology.incident(node) {
            if visited.skips(b) {
                continue;
            }
            if self.branches[b].kind != ComponentKind::VoltageSource {
                total += self.leaving(b, direction)?;
                continue;
            }

            visited.cross(b);
            match self.topology.far_terminal(b, direction) {
                Terminal::Node(j) => total += self.outflow(j, visited)?,
                Terminal::Ground => return Err(NodalError::SingularSystem),
            }
        }

        Ok(total)
    }

    /// Whether `node` connects to ground through voltage sources other than `excluded`.
    fn side_reaches_ground(&self, node: usize, excluded: usize) -> bool {
        let mut visited = Visited::excluding(excluded);
        let mut stack = vec![node];

        while let Some(n) = stack.pop() {
            if !visited.enter(n) {
                continue;
            }
            for (b, direction) in self.topology.incident(n) {
                if visited.skips(b) || self.branches[b].kind != ComponentKind::VoltageSource {
                    continue;
                }
                visited.cross(b);
                match self.topology.far_terminal(b, direction) {
                    Terminal::Ground => return true,
                    Terminal::Node(j) => stack.push(j),
                }
            }
        }

        false
    }
}
