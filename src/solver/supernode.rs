//! Supernode resolution for voltage-source clusters.
//!
//! An ideal voltage source pins the voltage difference between its terminals
//! but says nothing about its current, so neither terminal can have its own
//! KCL equation. Instead the terminals are merged into a supernode and a
//! single KCL balance is written across the whole cluster of nodes joined by
//! voltage sources.

use std::collections::{BTreeMap, HashSet};

use num_traits::Zero;

use crate::circuit::{Branch, ComponentKind, Direction, Scalar, Terminal, Topology};
use crate::error::{NodalError, Result};

/// A linear KCL balance `Σ coefficient·V(node) = constant`.
///
/// Coefficients are keyed by node index; a node reached through several
/// branches accumulates its coefficient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KclTerms {
    /// Coefficient of each node voltage
    pub coefficients: BTreeMap<usize, Scalar>,
    /// Right-hand side
    pub constant: Scalar,
}

impl KclTerms {
    /// Create an empty balance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Coefficient of a node, zero if absent.
    pub fn coefficient(&self, node: usize) -> Scalar {
        self.coefficients.get(&node).cloned().unwrap_or_else(Scalar::zero)
    }

    fn add_coefficient(&mut self, node: usize, value: &Scalar) {
        *self.coefficients.entry(node).or_insert_with(Scalar::zero) += value;
    }

    fn sub_coefficient(&mut self, node: usize, value: &Scalar) {
        *self.coefficients.entry(node).or_insert_with(Scalar::zero) -= value;
    }

    /// Add another balance term by term.
    pub fn merge(&mut self, other: KclTerms) {
        for (node, value) in other.coefficients {
            self.add_coefficient(node, &value);
        }
        self.constant += other.constant;
    }
}

/// Branches and nodes already crossed by a traversal.
///
/// Each voltage source is crossed at most once and each node entered at most
/// once, so traversals terminate even on malformed topologies.
#[derive(Debug, Default)]
pub(crate) struct Visited {
    branches: HashSet<usize>,
    nodes: HashSet<usize>,
}

impl Visited {
    pub(crate) fn excluding(branch: usize) -> Self {
        let mut visited = Self::default();
        visited.branches.insert(branch);
        visited
    }

    pub(crate) fn skips(&self, branch: usize) -> bool {
        self.branches.contains(&branch)
    }

    /// Mark a branch as crossed.
    pub(crate) fn cross(&mut self, branch: usize) {
        self.branches.insert(branch);
    }

    /// Enter a node; returns false if it was entered before.
    pub(crate) fn enter(&mut self, node: usize) -> bool {
        self.nodes.insert(node)
    }
}

/// Conductance of a resistor branch.
pub(crate) fn conductance(branch: &Branch) -> Result<Scalar> {
    if branch.value.is_zero() {
        return Err(NodalError::zero_valued(&branch.id, "has zero resistance"));
    }
    Ok(branch.value.recip())
}

/// Builds symbolic KCL balances across voltage-source clusters.
pub struct SupernodeResolver<'a> {
    branches: &'a [Branch],
    topology: &'a Topology,
}

impl<'a> SupernodeResolver<'a> {
    /// Create a resolver over a branch list and its topology.
    pub fn new(branches: &'a [Branch], topology: &'a Topology) -> Self {
        Self { branches, topology }
    }

    /// Net current leaving `node` through every incident branch except
    /// `excluded`, following voltage sources into the nodes behind them.
    ///
    /// With `excluded` set to one of the cluster's voltage sources, this is
    /// the balance on one side of that source.
    pub fn resolve(&self, node: usize, excluded: Option<usize>) -> Result<KclTerms> {
        let mut visited = match excluded {
            Some(b) => Visited::excluding(b),
            None => Visited::default(),
        };
        self.resolve_from(node, &mut visited)
    }

    /// KCL balance over the whole voltage-source cluster containing `node`.
    pub fn resolve_cluster(&self, node: usize) -> Result<KclTerms> {
        self.resolve(node, None)
    }

    fn resolve_from(&self, node: usize, visited: &mut Visited) -> Result<KclTerms> {
        let mut terms = KclTerms::new();
        if !visited.enter(node) {
            return Err(self.loop_error(node));
        }

        for (b, direction) in self.topology.incident(node) {
            if visited.skips(b) {
                continue;
            }
            let branch = &self.branches[b];
            let far = self.topology.far_terminal(b, direction);

            match branch.kind {
                ComponentKind::Resistor => {
                    let g = conductance(branch)?;
                    terms.add_coefficient(node, &g);
                    if let Terminal::Node(j) = far {
                        terms.sub_coefficient(j, &g);
                    }
                }
                ComponentKind::CurrentSource => match direction {
                    Direction::Outgoing => terms.constant += &branch.value,
                    Direction::Incoming => terms.constant -= &branch.value,
                },
                ComponentKind::VoltageSource => {
                    visited.cross(b);
                    match far {
                        Terminal::Node(j) => terms.merge(self.resolve_from(j, visited)?),
                        // The ground current is not an unknown, so a cluster
                        // tied to ground has no KCL balance.
                        Terminal::Ground => return Err(NodalError::SingularSystem),
                    }
                }
            }
        }

        Ok(terms)
    }

    fn loop_error(&self, node: usize) -> NodalError {
        let component = self
            .topology
            .incident(node)
            .map(|(b, _)| &self.branches[b])
            .find(|b| b.kind == ComponentKind::VoltageSource)
            .map(|b| b.id.clone())
            .unwrap_or_default();
        NodalError::VoltageLoop { component }
    }
}
