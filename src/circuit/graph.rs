//! The editable circuit held by a session.

use std::collections::HashMap;

use super::branch::Branch;
use super::types::{normalize_name, ComponentKind, Scalar};
use crate::dsl::{Assignment, BranchDef, Statement};
use crate::error::{NodalError, Result};

/// A branch as entered: two nodes and the component between them.
///
/// The component value lives in the circuit's component table so it can be
/// entered or edited separately from the branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Start node name
    pub start: String,
    /// Component id
    pub id: String,
    /// End node name
    pub end: String,
    /// Component kind
    pub kind: ComponentKind,
}

/// A component and its value, if one has been entered.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentEntry {
    /// Component id
    pub id: String,
    /// Component kind
    pub kind: ComponentKind,
    /// Value in ohms, volts or amperes
    pub value: Option<Scalar>,
}

/// The circuit being entered in a session.
///
/// Holds the ordered branch list and the component value table. Every
/// mutation bumps [`Circuit::revision`], which callers use to decide when a
/// cached solution is stale.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    connections: Vec<Connection>,
    components: Vec<ComponentEntry>,
    component_index: HashMap<String, usize>,
    revision: u64,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a branch.
    ///
    /// The component id must not already be used by another branch. A value
    /// given inline is recorded; if the component already has one, the branch
    /// is rejected with `ValueAlreadyAssigned` and the circuit is unchanged.
    pub fn add_branch(&mut self, def: BranchDef) -> Result<()> {
        let connection = Self::connection_from_def(&def)?;

        if self.connection(&connection.id).is_some() {
            return Err(NodalError::DuplicateComponent {
                name: connection.id,
            });
        }
        if def.value.is_some() && self.value(&connection.id).is_some() {
            return Err(NodalError::ValueAlreadyAssigned {
                name: connection.id,
            });
        }

        let entry = self.entry_mut(&connection.id, connection.kind);
        if def.value.is_some() {
            entry.value = def.value;
        }
        self.connections.push(connection);
        self.revision += 1;
        Ok(())
    }

    /// Record the value of a component that has none yet.
    pub fn assign_value(&mut self, id: &str, value: Scalar) -> Result<()> {
        let id = normalize_name(id);
        let kind = Self::kind_of(&id)?;

        if self.value(&id).is_some() {
            return Err(NodalError::ValueAlreadyAssigned { name: id });
        }

        self.entry_mut(&id, kind).value = Some(value);
        self.revision += 1;
        Ok(())
    }

    /// Set the value of a component, replacing any previous value.
    pub fn edit_value(&mut self, id: &str, value: Scalar) -> Result<()> {
        let id = normalize_name(id);
        let kind = Self::kind_of(&id)?;

        self.entry_mut(&id, kind).value = Some(value);
        self.revision += 1;
        Ok(())
    }

    /// Replace branch `number` (1-based) with a new description.
    pub fn replace_branch(&mut self, number: usize, def: BranchDef) -> Result<()> {
        let slot = number
            .checked_sub(1)
            .filter(|&i| i < self.connections.len())
            .ok_or(NodalError::BranchNotFound { number })?;

        let connection = Self::connection_from_def(&def)?;
        let taken = self
            .connections
            .iter()
            .enumerate()
            .any(|(i, c)| i != slot && c.id == connection.id);
        if taken {
            return Err(NodalError::DuplicateComponent {
                name: connection.id,
            });
        }

        let entry = self.entry_mut(&connection.id, connection.kind);
        if def.value.is_some() {
            entry.value = def.value;
        }
        self.connections[slot] = connection;
        self.revision += 1;
        Ok(())
    }

    /// Apply one netlist statement.
    pub fn apply(&mut self, statement: Statement) -> Result<()> {
        match statement {
            Statement::Branch(def) => self.add_branch(def),
            Statement::Assign(Assignment { id, value }) => self.assign_value(&id, value),
        }
    }

    /// Apply a whole netlist, or nothing if any statement fails.
    ///
    /// Returns the number of branches added.
    pub fn import(&mut self, statements: Vec<Statement>) -> Result<usize> {
        let mut staged = self.clone();
        let mut added = 0;
        for statement in statements {
            if matches!(statement, Statement::Branch(_)) {
                added += 1;
            }
            staged.apply(statement)?;
        }
        staged.revision = self.revision + 1;
        *self = staged;
        Ok(added)
    }

    /// Remove every branch and component.
    pub fn clear(&mut self) {
        self.connections.clear();
        self.components.clear();
        self.component_index.clear();
        self.revision += 1;
    }

    /// Branches in entry order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Components in entry order, including ones not yet placed in a branch.
    pub fn components(&self) -> &[ComponentEntry] {
        &self.components
    }

    /// Find the branch holding a component.
    pub fn connection(&self, id: &str) -> Option<&Connection> {
        let id = normalize_name(id);
        self.connections.iter().find(|c| c.id == id)
    }

    /// Get the value of a component, if assigned.
    pub fn value(&self, id: &str) -> Option<&Scalar> {
        let id = normalize_name(id);
        self.component_index
            .get(&id)
            .and_then(|&i| self.components[i].value.as_ref())
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Check if the circuit has no branches.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Snapshot the branch list with every value resolved.
    pub fn netlist(&self) -> Result<Vec<Branch>> {
        self.connections
            .iter()
            .map(|c| {
                let value = self
                    .value(&c.id)
                    .cloned()
                    .ok_or_else(|| NodalError::zero_valued(&c.id, "has no value assigned"))?;
                Ok(Branch {
                    start: c.start.clone(),
                    end: c.end.clone(),
                    kind: c.kind,
                    id: c.id.clone(),
                    value,
                })
            })
            .collect()
    }

    fn kind_of(id: &str) -> Result<ComponentKind> {
        ComponentKind::from_id(id).ok_or_else(|| {
            NodalError::invalid_component(id, "component ids start with R, V or I followed by a number")
        })
    }

    fn connection_from_def(def: &BranchDef) -> Result<Connection> {
        let id = normalize_name(&def.id);
        let kind = Self::kind_of(&id)?;
        Ok(Connection {
            start: normalize_name(&def.start),
            id,
            end: normalize_name(&def.end),
            kind,
        })
    }

    fn entry_mut(&mut self, id: &str, kind: ComponentKind) -> &mut ComponentEntry {
        let idx = match self.component_index.get(id) {
            Some(&i) => i,
            None => {
                self.components.push(ComponentEntry {
                    id: id.to_string(),
                    kind,
                    value: None,
                });
                let i = self.components.len() - 1;
                self.component_index.insert(id.to_string(), i);
                i
            }
        };
        &mut self.components[idx]
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    fn scalar(v: i64) -> Scalar {
        Scalar::from_integer(BigInt::from(v))
    }

    fn def(start: &str, id: &str, end: &str, value: Option<i64>) -> BranchDef {
        BranchDef {
            start: start.to_string(),
            id: id.to_string(),
            end: end.to_string(),
            value: value.map(scalar),
        }
    }

    #[test]
    fn test_add_branch_and_netlist() {
        let mut circuit = Circuit::new();
        circuit.add_branch(def("a", "v1", "gnd", Some(10))).unwrap();
        circuit.add_branch(def("A", "R1", "GND", Some(5))).unwrap();

        let netlist = circuit.netlist().unwrap();
        assert_eq!(netlist.len(), 2);
        assert_eq!(netlist[0].start, "A");
        assert_eq!(netlist[0].id, "V1");
        assert_eq!(netlist[0].kind, ComponentKind::VoltageSource);
        assert_eq!(netlist[1].value, scalar(5));
    }

    #[test]
    fn test_value_entered_separately() {
        let mut circuit = Circuit::new();
        circuit.add_branch(def("A", "R1", "GND", None)).unwrap();
        assert!(circuit.netlist().unwrap_err().is_value());

        circuit.assign_value("r1", scalar(100)).unwrap();
        assert_eq!(circuit.netlist().unwrap()[0].value, scalar(100));
    }

    #[test]
    fn test_value_before_branch() {
        let mut circuit = Circuit::new();
        circuit.assign_value("R1", scalar(3)).unwrap();
        circuit.add_branch(def("A", "R1", "GND", None)).unwrap();
        assert_eq!(circuit.value("R1"), Some(&scalar(3)));
    }

    #[test]
    fn test_inline_value_over_assigned_one_rejected() {
        let mut circuit = Circuit::new();
        circuit.assign_value("R1", scalar(3)).unwrap();
        let revision = circuit.revision();

        assert!(matches!(
            circuit.add_branch(def("A", "R1", "GND", Some(4))),
            Err(NodalError::ValueAlreadyAssigned { .. })
        ));
        assert!(circuit.is_empty());
        assert_eq!(circuit.value("R1"), Some(&scalar(3)));
        assert_eq!(circuit.revision(), revision);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut circuit = Circuit::new();
        circuit.add_branch(def("A", "R1", "GND", Some(1))).unwrap();
        assert!(matches!(
            circuit.add_branch(def("B", "R1", "GND", None)),
            Err(NodalError::DuplicateComponent { .. })
        ));
        assert!(matches!(
            circuit.assign_value("R1", scalar(2)),
            Err(NodalError::ValueAlreadyAssigned { .. })
        ));
        assert_eq!(circuit.len(), 1);
    }

    #[test]
    fn test_edit_value_bumps_revision() {
        let mut circuit = Circuit::new();
        circuit.add_branch(def("A", "R1", "GND", Some(1))).unwrap();
        let before = circuit.revision();
        circuit.edit_value("R1", scalar(2)).unwrap();
        assert!(circuit.revision() > before);
        assert_eq!(circuit.value("R1"), Some(&scalar(2)));
    }

    #[test]
    fn test_replace_branch() {
        let mut circuit = Circuit::new();
        circuit.add_branch(def("A", "R1", "GND", Some(1))).unwrap();
        circuit.add_branch(def("A", "R2", "B", Some(2))).unwrap();

        circuit.replace_branch(2, def("B", "R2", "A", None)).unwrap();
        assert_eq!(circuit.connections()[1].start, "B");
        assert_eq!(circuit.value("R2"), Some(&scalar(2)));

        assert!(matches!(
            circuit.replace_branch(3, def("A", "R3", "B", None)),
            Err(NodalError::BranchNotFound { number: 3 })
        ));
        assert!(matches!(
            circuit.replace_branch(0, def("A", "R3", "B", None)),
            Err(NodalError::BranchNotFound { number: 0 })
        ));
        assert!(matches!(
            circuit.replace_branch(2, def("A", "R1", "B", None)),
            Err(NodalError::DuplicateComponent { .. })
        ));
    }

    #[test]
    fn test_import_is_atomic() {
        let mut circuit = Circuit::new();
        circuit.add_branch(def("A", "R1", "GND", Some(1))).unwrap();

        let statements = vec![
            Statement::Branch(def("A", "V1", "GND", Some(5))),
            Statement::Branch(def("B", "R1", "GND", None)),
        ];
        assert!(circuit.import(statements).is_err());
        assert_eq!(circuit.len(), 1);
        assert!(circuit.connection("V1").is_none());

        let statements = vec![
            Statement::Branch(def("A", "V1", "GND", None)),
            Statement::Assign(Assignment {
                id: "V1".to_string(),
                value: scalar(5),
            }),
        ];
        assert_eq!(circuit.import(statements).unwrap(), 1);
        assert_eq!(circuit.value("V1"), Some(&scalar(5)));
    }

    #[test]
    fn test_clear() {
        let mut circuit = Circuit::new();
        circuit.add_branch(def("A", "R1", "GND", Some(1))).unwrap();
        circuit.clear();
        assert!(circuit.is_empty());
        assert!(circuit.components().is_empty());
    }
}
