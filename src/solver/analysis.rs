//! DC operating point: solved node voltages and on-demand branch queries.

use std::collections::HashMap;

use num_traits::Zero;

use crate::circuit::{is_ground, normalize_name, validate_branches, Branch, Scalar, Topology};
use crate::error::{NodalError, Result};

use super::assembler::assemble;
use super::current::CurrentEvaluator;

/// Node voltages relative to ground, one per non-ground node.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    nodes: Vec<String>,
    voltages: Vec<Scalar>,
    index: HashMap<String, usize>,
}

impl Solution {
    /// Pair node names with their solved voltages (same order).
    pub fn new(nodes: Vec<String>, voltages: Vec<Scalar>) -> Self {
        debug_assert_eq!(nodes.len(), voltages.len());
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            nodes,
            voltages,
            index,
        }
    }

    /// Number of solved nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node was solved.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node names in solution order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Voltages in solution order.
    pub fn voltages(&self) -> &[Scalar] {
        &self.voltages
    }

    /// Iterate over `(node, voltage)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.nodes.iter().map(String::as_str).zip(self.voltages.iter())
    }

    /// Voltage of a node; ground is always zero.
    pub fn voltage(&self, node: &str) -> Result<Scalar> {
        let name = normalize_name(node);
        if is_ground(&name) {
            return Ok(Scalar::zero());
        }
        self.index
            .get(&name)
            .map(|&i| self.voltages[i].clone())
            .ok_or_else(|| NodalError::unknown_node(name))
    }
}

/// Solve a branch list for its node voltages.
pub fn solve(branches: &[Branch]) -> Result<Solution> {
    let topology = Topology::build(branches);
    solve_with(branches, &topology)
}

fn solve_with(branches: &[Branch], topology: &Topology) -> Result<Solution> {
    validate_branches(branches)?;
    let matrix = assemble(branches, topology)?;
    let voltages = matrix.solve()?;
    Ok(Solution::new(topology.nodes().to_vec(), voltages))
}

/// One solve of a circuit snapshot plus its queries.
///
/// Owns its copy of the branches, so later edits to the session circuit
/// cannot change an existing analysis.
#[derive(Debug, Clone)]
pub struct DcAnalysis {
    branches: Vec<Branch>,
    topology: Topology,
    solution: Solution,
}

impl DcAnalysis {
    /// Validate, assemble and solve a branch list.
    pub fn run(branches: Vec<Branch>) -> Result<Self> {
        let topology = Topology::build(&branches);
        let solution = solve_with(&branches, &topology)?;
        Ok(Self {
            branches,
            topology,
            solution,
        })
    }

    /// The solved node voltages.
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// The branches this analysis was run on.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The topology index used for assembly.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Current evaluator over this analysis.
    pub fn evaluator(&self) -> CurrentEvaluator<'_> {
        CurrentEvaluator::new(&self.branches, &self.topology, self.solution.voltages())
    }

    /// Voltage of a node.
    pub fn voltage(&self, node: &str) -> Result<Scalar> {
        self.solution.voltage(node)
    }

    /// Voltage across a component.
    pub fn voltage_across(&self, id: &str) -> Result<Scalar> {
        self.evaluator().voltage_across(id)
    }

    /// Current through a component.
    pub fn current_through(&self, id: &str) -> Result<Scalar> {
        self.evaluator().current_through(id)
    }

    /// Current through every component, in branch order.
    ///
    /// A failure for one component does not stop the others.
    pub fn currents(&self) -> Vec<(String, Result<Scalar>)> {
        let evaluator = self.evaluator();
        self.branches
            .iter()
            .map(|b| (b.id.clone(), evaluator.current_through(&b.id)))
            .collect()
    }

    /// Net current leaving a node (zero up to exact arithmetic).
    pub fn net_current_leaving(&self, node: &str) -> Result<Scalar> {
        self.evaluator().net_current_leaving(node)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    fn q(n: i64, d: i64) -> Scalar {
        Scalar::new(BigInt::from(n), BigInt::from(d))
    }

    fn branch(start: &str, id: &str, end: &str, value: Scalar) -> Branch {
        Branch::new(start, id, end, value).unwrap()
    }

    fn int(v: i64) -> Scalar {
        q(v, 1)
    }

    fn assert_conservation(analysis: &DcAnalysis) {
        for node in analysis.solution().nodes() {
            assert!(
                analysis.net_current_leaving(node).unwrap().is_zero(),
                "KCL violated at {node}"
            );
        }
    }

    #[test]
    fn test_single_resistor_across_source() {
        // R0 gives the pair its ground reference
        let analysis = DcAnalysis::run(vec![
            branch("A", "V1", "B", int(10)),
            branch("A", "R1", "B", int(5)),
            branch("B", "R0", "GND", int(1)),
        ])
        .unwrap();
        assert_eq!(analysis.voltage("A").unwrap(), int(10));
        assert_eq!(analysis.voltage_across("V1").unwrap(), int(10));
        assert_eq!(analysis.current_through("R1").unwrap(), int(2));
        assert_eq!(analysis.current_through("V1").unwrap(), int(-2));
        assert_conservation(&analysis);
    }

    #[test]
    fn test_source_with_resistor_to_ground() {
        let analysis = DcAnalysis::run(vec![
            branch("A", "V1", "B", int(10)),
            branch("A", "R1", "B", int(5)),
            branch("B", "V0", "GND", int(0)),
        ])
        .unwrap();
        assert_eq!(analysis.voltage("A").unwrap(), int(10));
        assert_eq!(analysis.voltage("B").unwrap(), int(0));
        assert_eq!(analysis.current_through("R1").unwrap(), int(2));
        assert_eq!(analysis.current_through("V1").unwrap(), int(-2));
        assert_conservation(&analysis);
    }

    #[test]
    fn test_series_sources_without_return_path() {
        let analysis = DcAnalysis::run(vec![
            branch("A", "V1", "B", int(5)),
            branch("B", "V2", "C", int(3)),
            branch("C", "R1", "GND", int(4)),
        ])
        .unwrap();
        let i1 = analysis.current_through("V1").unwrap();
        assert_eq!(i1, analysis.current_through("V2").unwrap());
        assert_eq!(i1, analysis.current_through("R1").unwrap());
        assert_eq!(analysis.voltage("A").unwrap(), int(8));
        assert_conservation(&analysis);
    }

    #[test]
    fn test_series_sources_with_load() {
        // A -V1(5)- B -V2(3)- C -R1(4)- GND, loop closed by GND -R2(4)- A
        let analysis = DcAnalysis::run(vec![
            branch("A", "V1", "B", int(5)),
            branch("B", "V2", "C", int(3)),
            branch("C", "R1", "GND", int(4)),
            branch("GND", "R2", "A", int(4)),
        ])
        .unwrap();
        // 8 V around an 8 ohm loop: 1 A from A back round to C
        assert_eq!(analysis.voltage("A").unwrap(), int(4));
        assert_eq!(analysis.voltage("C").unwrap(), int(-4));
        assert_eq!(analysis.current_through("R1").unwrap(), int(-1));
        assert_eq!(analysis.current_through("R2").unwrap(), int(-1));
        assert_eq!(analysis.current_through("V1").unwrap(), int(-1));
        assert_eq!(analysis.current_through("V2").unwrap(), int(-1));
        assert_conservation(&analysis);
    }

    #[test]
    fn test_current_source_into_ground() {
        let analysis = DcAnalysis::run(vec![
            branch("A", "I1", "GND", int(1)),
            branch("A", "R1", "GND", int(10)),
        ])
        .unwrap();
        assert_eq!(analysis.voltage("A").unwrap(), int(10));
        assert_eq!(analysis.current_through("R1").unwrap(), int(1));
        assert_eq!(analysis.current_through("I1").unwrap(), int(1));
        assert_conservation(&analysis);
    }

    #[test]
    fn test_current_sources_inside_supernode() {
        // Floating source between A and B, each side fed by a current source
        let analysis = DcAnalysis::run(vec![
            branch("A", "V1", "B", int(6)),
            branch("A", "I1", "GND", int(2)),
            branch("B", "I2", "GND", int(1)),
            branch("A", "R1", "GND", int(3)),
            branch("B", "R2", "GND", int(6)),
        ])
        .unwrap();
        // V(A)/3 + (V(A)-6)/6 = 3  ->  V(A) = 8
        assert_eq!(analysis.voltage("A").unwrap(), int(8));
        assert_eq!(analysis.voltage("B").unwrap(), int(2));
        assert_eq!(analysis.current_through("V1").unwrap(), q(-2, 3));
        assert_conservation(&analysis);
    }

    #[test]
    fn test_grounded_cluster_with_negative_terminal() {
        let analysis = DcAnalysis::run(vec![
            branch("GND", "V1", "A", int(5)),
            branch("A", "V2", "B", int(3)),
            branch("B", "R1", "GND", int(2)),
            branch("A", "R2", "GND", int(5)),
        ])
        .unwrap();
        assert_eq!(analysis.voltage("A").unwrap(), int(-5));
        assert_eq!(analysis.voltage("B").unwrap(), int(-8));
        assert_eq!(analysis.current_through("R1").unwrap(), int(-4));
        assert_eq!(analysis.current_through("V2").unwrap(), int(-4));
        assert_conservation(&analysis);
    }

    #[test]
    fn test_nested_source_tree() {
        // Two sources hang off A, nothing ties the cluster to ground directly
        let analysis = DcAnalysis::run(vec![
            branch("A", "V1", "B", int(1)),
            branch("C", "V2", "A", int(2)),
            branch("B", "R1", "GND", int(1)),
            branch("C", "R2", "GND", int(1)),
            branch("A", "R3", "D", int(2)),
            branch("D", "I1", "GND", int(1)),
        ])
        .unwrap();
        assert_conservation(&analysis);
        let va = analysis.voltage("A").unwrap();
        assert!(va.is_zero());
        assert_eq!(analysis.voltage("B").unwrap(), &va - int(1));
        assert_eq!(analysis.voltage("C").unwrap(), &va + int(2));
    }

    #[test]
    fn test_wide_value_range_is_exact() {
        // 1 pA through 1 TOhm is exactly 1 V
        let analysis = DcAnalysis::run(vec![
            branch("A", "I1", "GND", q(1, 1_000_000_000_000)),
            branch("A", "R1", "GND", int(1_000_000_000_000)),
        ])
        .unwrap();
        assert_eq!(analysis.voltage("A").unwrap(), int(1));
    }

    #[test]
    fn test_solution_covers_every_non_ground_node() {
        let branches = vec![
            branch("A", "V1", "GND", int(9)),
            branch("A", "R1", "B", int(1)),
            branch("B", "R2", "C", int(1)),
            branch("C", "R3", "GND", int(1)),
        ];
        let solution = solve(&branches).unwrap();
        assert_eq!(solution.len(), 3);
        assert_eq!(solution.nodes(), &["A".to_string(), "B".to_string(), "C".to_string()]);
        assert_eq!(solution.voltage("c").unwrap(), int(3));
        assert_eq!(solution.voltage("GND").unwrap(), int(0));
    }

    #[test]
    fn test_resolve_twice_is_identical() {
        let branches = vec![
            branch("A", "V1", "B", q(33, 10)),
            branch("B", "R1", "GND", int(4700)),
            branch("A", "R2", "GND", q(22, 1000)),
            branch("B", "I1", "A", q(1, 1000)),
        ];
        let first = DcAnalysis::run(branches.clone()).unwrap();
        let second = DcAnalysis::run(branches).unwrap();
        assert_eq!(first.solution(), second.solution());
        assert_eq!(
            first.current_through("V1").unwrap(),
            second.current_through("V1").unwrap()
        );
    }

    #[test]
    fn test_unknown_component_leaves_solution_alone() {
        let analysis = DcAnalysis::run(vec![
            branch("A", "V1", "GND", int(1)),
            branch("A", "R1", "GND", int(1)),
        ])
        .unwrap();
        let before = analysis.solution().clone();
        assert!(analysis.current_through("R7").unwrap_err().is_lookup());
        assert!(analysis.voltage("Z").unwrap_err().is_lookup());
        assert_eq!(analysis.solution(), &before);

        let currents = analysis.currents();
        assert_eq!(currents.len(), 2);
        assert!(currents.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn test_floating_node_is_singular() {
        let result = DcAnalysis::run(vec![
            branch("A", "R1", "GND", int(1)),
            branch("B", "R2", "C", int(1)),
        ]);
        assert!(matches!(result, Err(NodalError::SingularSystem)));
    }

    #[test]
    fn test_no_ground_is_singular() {
        let result = DcAnalysis::run(vec![branch("A", "R1", "B", int(1)), branch("A", "I1", "B", int(1))]);
        assert!(result.unwrap_err().is_structural());
    }

    #[test]
    fn test_zero_resistor_detected_before_solving() {
        let result = DcAnalysis::run(vec![branch("A", "R1", "GND", int(0))]);
        assert!(result.unwrap_err().is_value());
    }
}
