//! Finalized circuit branches.

use std::fmt;

use super::types::{is_ground, normalize_name, ComponentKind, Scalar};
use crate::error::{NodalError, Result};

/// One component instance connecting two nodes, with its value resolved.
///
/// Current through the branch is measured from `start` to `end`, except for
/// current sources whose value is the current delivered out of `start`.
/// For a voltage source `start` is the positive terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    /// Start node name (normalized)
    pub start: String,
    /// End node name (normalized)
    pub end: String,
    /// Component kind, resolved from the id
    pub kind: ComponentKind,
    /// Component id, unique across the circuit
    pub id: String,
    /// Component value in ohms, volts or amperes
    pub value: Scalar,
}

impl Branch {
    /// Create a branch, normalizing names and resolving the component kind.
    pub fn new(start: &str, id: &str, end: &str, value: Scalar) -> Result<Self> {
        let id = normalize_name(id);
        let kind = ComponentKind::from_id(&id).ok_or_else(|| {
            NodalError::invalid_component(&id, "component ids start with R, V or I followed by a number")
        })?;
        Ok(Self {
            start: normalize_name(start),
            end: normalize_name(end),
            kind,
            id,
            value,
        })
    }

    /// Check if the start node is ground.
    pub fn starts_at_ground(&self) -> bool {
        is_ground(&self.start)
    }

    /// Check if the end node is ground.
    pub fn ends_at_ground(&self) -> bool {
        is_ground(&self.end)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}={} {}", self.start, self.id, self.value, self.end)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    #[test]
    fn test_branch_normalizes_names() {
        let b = Branch::new("a", "r1", "gnd", Scalar::from_integer(BigInt::from(5))).unwrap();
        assert_eq!(b.start, "A");
        assert_eq!(b.end, "GND");
        assert_eq!(b.id, "R1");
        assert_eq!(b.kind, ComponentKind::Resistor);
        assert!(b.ends_at_ground());
        assert!(!b.starts_at_ground());
        assert_eq!(b.to_string(), "A R1=5 GND");
    }

    #[test]
    fn test_branch_rejects_unknown_kind() {
        let err = Branch::new("A", "C1", "B", Scalar::from_integer(BigInt::from(1))).unwrap_err();
        assert!(matches!(err, NodalError::InvalidComponent { .. }));
    }
}
