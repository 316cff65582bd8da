//! Core types for circuit representation.

use std::fmt;

use num_rational::BigRational;

/// Exact scalar used for every component value, voltage and current.
pub type Scalar = BigRational;

/// Reserved name of the ground reference node.
pub const GROUND: &str = "GND";

/// Normalize a node or component name (names are case-insensitive).
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Check whether a (normalized) node name is the ground node.
pub fn is_ground(name: &str) -> bool {
    name == GROUND
}

/// The kind of a two-terminal component.
///
/// Resolved once from the letters of the component id when a branch is
/// built, so ids like `R1` or `r12` are not re-parsed on every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Resistor, value in ohms
    Resistor,
    /// Ideal DC voltage source, value in volts; start node is the positive terminal
    VoltageSource,
    /// Ideal DC current source, value in amperes delivered out of the start node
    CurrentSource,
}

impl ComponentKind {
    /// Resolve the component kind from a component id.
    ///
    /// The alphabetic characters of the id must spell exactly `R`, `V` or `I`,
    /// so `R1` is a resistor while `RV1` is rejected.
    pub fn from_id(id: &str) -> Option<Self> {
        let letters: String = id
            .chars()
            .filter(|c| c.is_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match letters.as_str() {
            "R" => Some(Self::Resistor),
            "V" => Some(Self::VoltageSource),
            "I" => Some(Self::CurrentSource),
            _ => None,
        }
    }

    /// Unit of the component value.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Resistor => "OHMS",
            Self::VoltageSource => "VOLTS",
            Self::CurrentSource => "AMPERES",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resistor => write!(f, "resistor"),
            Self::VoltageSource => write!(f, "voltage source"),
            Self::CurrentSource => write!(f, "current source"),
        }
    }
}

/// Direction of a branch relative to one of its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The node is the branch's start node
    Outgoing,
    /// The node is the branch's end node
    Incoming,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_id() {
        assert_eq!(ComponentKind::from_id("R1"), Some(ComponentKind::Resistor));
        assert_eq!(ComponentKind::from_id("v12"), Some(ComponentKind::VoltageSource));
        assert_eq!(ComponentKind::from_id("I3"), Some(ComponentKind::CurrentSource));
        assert_eq!(ComponentKind::from_id("RV1"), None);
        assert_eq!(ComponentKind::from_id("C1"), None);
        assert_eq!(ComponentKind::from_id("42"), None);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(" gnd "), GROUND);
        assert!(is_ground(&normalize_name("Gnd")));
        assert!(!is_ground("A"));
    }
}
