//! Nodal equation assembly.
//!
//! One row per non-ground node. A node untouched by voltage sources gets its
//! plain KCL equation (sum of currents leaving the node is zero). Every
//! voltage source contributes one constraint row `V(start) - V(end) = E`,
//! carried by a node of its cluster, and each cluster not tied to ground gets
//! one supernode KCL row from the [`SupernodeResolver`].

use num_traits::One;

use crate::circuit::{Branch, ComponentKind, Direction, Scalar, Terminal, Topology};
use crate::error::{NodalError, Result};

use super::matrix::AugmentedMatrix;
use super::supernode::{conductance, KclTerms, SupernodeResolver};

/// Decide which voltage source's constraint each node row carries.
///
/// Voltage sources form a forest over the nodes (ground included). Each tree
/// is walked from ground if it contains ground, otherwise from its first
/// node in topology order, and every source is pinned to the node it leads
/// to. The starting node of a tree without ground carries no constraint and
/// is left for the supernode balance.
///
/// Fails with [`NodalError::VoltageLoop`] if a source closes a cycle.
pub fn pin_voltage_sources(branches: &[Branch], topology: &Topology) -> Result<Vec<Option<usize>>> {
    let n = topology.len();
    let mut pins = vec![None; n];
    let mut reached = vec![false; n];
    let mut crossed = vec![false; branches.len()];
    let mut stack = Vec::new();

    let roots = std::iter::once(Terminal::Ground).chain((0..n).map(Terminal::Node));
    for root in roots {
        if let Terminal::Node(i) = root {
            if reached[i] {
                continue;
            }
            reached[i] = true;
        }
        stack.push(root);

        while let Some(node) = stack.pop() {
            let incident: Vec<(usize, Direction)> = match node {
                Terminal::Ground => topology
                    .ground_branches()
                    .iter()
                    .map(|&b| {
                        if branches[b].starts_at_ground() {
                            (b, Direction::Outgoing)
                        } else {
                            (b, Direction::Incoming)
                        }
                    })
                    .collect(),
                Terminal::Node(i) => topology.incident(i).collect(),
            };

            for (b, direction) in incident {
                if branches[b].kind != ComponentKind::VoltageSource || crossed[b] {
                    continue;
                }
                crossed[b] = true;

                match topology.far_terminal(b, direction) {
                    Terminal::Node(j) if !reached[j] => {
                        reached[j] = true;
                        pins[j] = Some(b);
                        stack.push(Terminal::Node(j));
                    }
                    _ => {
                        return Err(NodalError::VoltageLoop {
                            component: branches[b].id.clone(),
                        })
                    }
                }
            }
        }
    }

    Ok(pins)
}

/// Build the augmented nodal matrix for a validated branch list.
pub fn assemble(branches: &[Branch], topology: &Topology) -> Result<AugmentedMatrix> {
    let pins = pin_voltage_sources(branches, topology)?;
    let resolver = SupernodeResolver::new(branches, topology);
    let mut matrix = AugmentedMatrix::new(topology.len());

    for i in 0..topology.len() {
        for (b, direction) in topology.incident(i) {
            let branch = &branches[b];
            match branch.kind {
                ComponentKind::Resistor => {
                    let g = conductance(branch)?;
                    matrix.add(i, i, &g);
                    if let Terminal::Node(j) = topology.far_terminal(b, direction) {
                        matrix.sub(i, j, &g);
                    }
                }
                ComponentKind::CurrentSource => match direction {
                    Direction::Outgoing => matrix.add_rhs(i, &branch.value),
                    Direction::Incoming => matrix.sub_rhs(i, &branch.value),
                },
                ComponentKind::VoltageSource => {
                    // The row is no longer a plain KCL sum
                    matrix.clear_row(i);
                    match pins[i] {
                        Some(pinned) => stamp_constraint(&mut matrix, i, branches, topology, pinned),
                        None => stamp_terms(&mut matrix, i, resolver.resolve_cluster(i)?),
                    }
                    break;
                }
            }
        }
    }

    Ok(matrix)
}

/// Write `V(start) - V(end) = E` into `row`, omitting ground.
fn stamp_constraint(
    matrix: &mut AugmentedMatrix,
    row: usize,
    branches: &[Branch],
    topology: &Topology,
    source: usize,
) {
    let (start, end) = topology.ends(source);
    if let Terminal::Node(p) = start {
        matrix.add(row, p, &Scalar::one());
    }
    if let Terminal::Node(m) = end {
        matrix.sub(row, m, &Scalar::one());
    }
    matrix.set_rhs(row, branches[source].value.clone());
}

fn stamp_terms(matrix: &mut AugmentedMatrix, row: usize, terms: KclTerms) {
    for (node, coefficient) in terms.coefficients {
        matrix.add(row, node, &coefficient);
    }
    matrix.add_rhs(row, &terms.constant);
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use num_traits::Zero;

    use super::*;

    fn q(n: i64, d: i64) -> Scalar {
        Scalar::new(BigInt::from(n), BigInt::from(d))
    }

    fn branch(start: &str, id: &str, end: &str, value: i64) -> Branch {
        Branch::new(start, id, end, q(value, 1)).unwrap()
    }

    #[test]
    fn test_resistive_divider_rows() {
        // A -R1(2)- B -R2(2)- GND, 1 A injected into A
        let branches = vec![
            branch("A", "R1", "B", 2),
            branch("B", "R2", "GND", 2),
            branch("A", "I1", "GND", 1),
        ];
        let topo = Topology::build(&branches);
        let m = assemble(&branches, &topo).unwrap();

        assert_eq!(m.get(0, 0), &q(1, 2));
        assert_eq!(m.get(0, 1), &q(-1, 2));
        assert_eq!(m.rhs(0), &q(1, 1));
        assert_eq!(m.get(1, 0), &q(-1, 2));
        assert_eq!(m.get(1, 1), &q(1, 1));
        assert!(m.rhs(1).is_zero());
    }

    #[test]
    fn test_grounded_source_rows() {
        // GND -V1(5)- A: the negative terminal row becomes V(A) = -5
        let branches = vec![branch("GND", "V1", "A", 5), branch("A", "R1", "GND", 1)];
        let topo = Topology::build(&branches);
        let m = assemble(&branches, &topo).unwrap();

        assert_eq!(m.get(0, 0), &q(-1, 1));
        assert_eq!(m.rhs(0), &q(5, 1));
    }

    #[test]
    fn test_floating_source_rows() {
        // A -V1(10)- B, A -R1(5)- B, B -R2(5)- GND
        let branches = vec![
            branch("A", "V1", "B", 10),
            branch("A", "R1", "B", 5),
            branch("B", "R2", "GND", 5),
        ];
        let topo = Topology::build(&branches);
        let m = assemble(&branches, &topo).unwrap();

        // A roots the cluster: supernode balance, R1 cancels inside it
        assert!(m.get(0, 0).is_zero());
        assert_eq!(m.get(0, 1), &q(1, 5));
        // B carries the source constraint
        assert_eq!(m.get(1, 0), &q(1, 1));
        assert_eq!(m.get(1, 1), &q(-1, 1));
        assert_eq!(m.rhs(1), &q(10, 1));
    }

    #[test]
    fn test_pins_follow_ground_first() {
        // GND -V1- A -V2- B: both rows are constraints, no supernode needed
        let branches = vec![
            branch("A", "V2", "B", 3),
            branch("GND", "V1", "A", 5),
            branch("B", "R1", "GND", 1),
        ];
        let topo = Topology::build(&branches);
        let pins = pin_voltage_sources(&branches, &topo).unwrap();
        assert_eq!(pins, vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_star_of_sources() {
        // Two sources sharing their positive terminal
        let branches = vec![
            branch("A", "V1", "B", 1),
            branch("A", "V2", "C", 2),
            branch("B", "R1", "GND", 1),
            branch("C", "R2", "GND", 1),
        ];
        let topo = Topology::build(&branches);
        let pins = pin_voltage_sources(&branches, &topo).unwrap();
        assert_eq!(pins.iter().filter(|p| p.is_some()).count(), 2);
        assert_eq!(pins[0], None);
        assert!(assemble(&branches, &topo).unwrap().solve().is_ok());
    }

    #[test]
    fn test_source_loop_rejected() {
        let branches = vec![
            branch("A", "V1", "GND", 1),
            branch("A", "V2", "GND", 1),
            branch("A", "R1", "GND", 1),
        ];
        let topo = Topology::build(&branches);
        assert!(matches!(
            assemble(&branches, &topo),
            Err(NodalError::VoltageLoop { component }) if component == "V2"
        ));
    }

    #[test]
    fn test_self_loop_rejected() {
        let branches = vec![branch("A", "V1", "A", 1), branch("A", "R1", "GND", 1)];
        let topo = Topology::build(&branches);
        assert!(pin_voltage_sources(&branches, &topo).is_err());
    }
}
