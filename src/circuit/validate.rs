//! Branch list validation.

use std::collections::HashSet;

use num_traits::Zero;

use super::{Branch, ComponentKind};
use crate::error::{NodalError, Result};

/// Validate a finalized branch list before it is handed to the assembler.
///
/// Checks:
/// - Component ids are unique (they are used as lookup keys)
/// - No resistor has a value of zero
pub fn validate_branches(branches: &[Branch]) -> Result<()> {
    let mut seen = HashSet::with_capacity(branches.len());

    for branch in branches {
        if !seen.insert(branch.id.as_str()) {
            return Err(NodalError::DuplicateComponent {
                name: branch.id.clone(),
            });
        }

        if branch.kind == ComponentKind::Resistor && branch.value.is_zero() {
            return Err(NodalError::zero_valued(&branch.id, "has zero resistance"));
        }
    }

    Ok(())
}
