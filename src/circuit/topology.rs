//! Topology index: which branches start and end at each node.

use std::collections::HashMap;

use super::branch::Branch;
use super::types::{is_ground, Direction};

/// One end of a branch: the ground reference or a non-ground node index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// The ground node (always 0 V, never an unknown)
    Ground,
    /// A non-ground node, by topology index
    Node(usize),
}

impl Terminal {
    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        matches!(self, Terminal::Ground)
    }
}

/// Per-node branch lists for a fixed branch slice.
///
/// Nodes are numbered in order of first appearance (start node before end
/// node, branch by branch). Ground is never numbered. Every branch index
/// appears in exactly one outgoing list unless it starts at ground and in
/// exactly one incoming list unless it ends at ground.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    ends: Vec<(Terminal, Terminal)>,
    grounded: Vec<usize>,
}

impl Topology {
    /// Build the index for a branch list.
    pub fn build(branches: &[Branch]) -> Self {
        let mut topology = Topology {
            nodes: Vec::new(),
            index: HashMap::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            ends: Vec::with_capacity(branches.len()),
            grounded: Vec::new(),
        };

        for (b, branch) in branches.iter().enumerate() {
            let start = topology.intern(&branch.start);
            let end = topology.intern(&branch.end);

            if let Terminal::Node(i) = start {
                topology.outgoing[i].push(b);
            }
            if let Terminal::Node(j) = end {
                topology.incoming[j].push(b);
            }
            if start.is_ground() || end.is_ground() {
                topology.grounded.push(b);
            }
            topology.ends.push((start, end));
        }

        topology
    }

    fn intern(&mut self, name: &str) -> Terminal {
        if is_ground(name) {
            return Terminal::Ground;
        }
        if let Some(&i) = self.index.get(name) {
            return Terminal::Node(i);
        }
        let i = self.nodes.len();
        self.nodes.push(name.to_string());
        self.index.insert(name.to_string(), i);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Terminal::Node(i)
    }

    /// Number of non-ground nodes (the number of unknowns).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the circuit has no non-ground nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Non-ground node names in index order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Find a node index by (normalized) name.
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Branches starting at a node.
    pub fn outgoing(&self, node: usize) -> &[usize] {
        &self.outgoing[node]
    }

    /// Branches ending at a node.
    pub fn incoming(&self, node: usize) -> &[usize] {
        &self.incoming[node]
    }

    /// All branches touching a node, outgoing ones first.
    pub fn incident(&self, node: usize) -> impl Iterator<Item = (usize, Direction)> + '_ {
        self.outgoing[node]
            .iter()
            .map(|&b| (b, Direction::Outgoing))
            .chain(self.incoming[node].iter().map(|&b| (b, Direction::Incoming)))
    }

    /// Branches with at least one end at ground.
    pub fn ground_branches(&self) -> &[usize] {
        &self.grounded
    }

    /// Start and end terminals of a branch.
    pub fn ends(&self, branch: usize) -> (Terminal, Terminal) {
        self.ends[branch]
    }

    /// The terminal across a branch from the side given by `direction`.
    pub fn far_terminal(&self, branch: usize, direction: Direction) -> Terminal {
        let (start, end) = self.ends[branch];
        match direction {
            Direction::Outgoing => end,
            Direction::Incoming => start,
        }
    }
}
