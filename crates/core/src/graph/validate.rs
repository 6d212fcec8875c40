//! Input validation ahead of table generation

use super::{DependencyGraph, VarId};
use crate::variable::LeafValues;
use thiserror::Error;
use tracing::warn;

/// Why the current inputs cannot be evaluated.
///
/// Every variant names the variable so a caller can move focus to it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{name}: {reason} (at {position}, length {length})")]
    InvalidLeafValue {
        variable: VarId,
        name: String,
        /// Character offset of the offending text
        position: usize,
        /// Character length of the offending text
        length: usize,
        reason: String,
    },

    #[error("{name} is required but has no value")]
    MissingRequiredInput { variable: VarId, name: String },

    #[error("{count} ranging variables requested, at most 2 are allowed")]
    TooManyRangingVariables { count: usize },

    #[error("{name} is computed and cannot range")]
    RangingVariableNotLeaf { variable: VarId, name: String },

    #[error("{name}: {reason}")]
    InvalidRange {
        variable: VarId,
        name: String,
        reason: String,
    },
}

impl InputError {
    /// Variable to focus, if the error concerns one
    pub fn variable(&self) -> Option<VarId> {
        match self {
            InputError::InvalidLeafValue { variable, .. }
            | InputError::MissingRequiredInput { variable, .. }
            | InputError::RangingVariableNotLeaf { variable, .. }
            | InputError::InvalidRange { variable, .. } => Some(*variable),
            InputError::TooManyRangingVariables { .. } => None,
        }
    }

    /// `(position, length)` of the text to highlight
    pub fn span(&self) -> Option<(usize, usize)> {
        match self {
            InputError::InvalidLeafValue {
                position, length, ..
            } => Some((*position, *length)),
            _ => None,
        }
    }
}

impl DependencyGraph {
    /// Check every required leaf's store, in required order.
    ///
    /// Returns the first blank or unparsable store.
    pub fn validate_inputs(&self) -> Result<(), InputError> {
        for &id in &self.required {
            let variable = &self.variables[id.index()];
            let store = variable.store();
            if store.trim().is_empty() {
                warn!("Missing required input {}", variable.name());
                return Err(InputError::MissingRequiredInput {
                    variable: id,
                    name: variable.name().to_string(),
                });
            }
            match variable.parse_store(store) {
                Ok(LeafValues::Numbers(v)) if v.is_empty() => {
                    return Err(InputError::MissingRequiredInput {
                        variable: id,
                        name: variable.name().to_string(),
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Invalid input for {}: {}", variable.name(), e.reason);
                    return Err(InputError::InvalidLeafValue {
                        variable: id,
                        name: variable.name().to_string(),
                        position: e.position,
                        length: e.length,
                        reason: e.reason,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Condition, Configuration};
    use crate::function::{Inputs, Outputs};
    use crate::graph::{GraphBuilder, GraphError};
    use crate::units::UnitsRegistry;
    use crate::variable::ContinuousSpec;
    use std::sync::Arc;

    fn graph() -> (DependencyGraph, VarId, VarId, VarId) {
        let mut b = GraphBuilder::new(Arc::new(UnitsRegistry::standard()));
        let slope = b
            .continuous("slope", ContinuousSpec::new("%", 0.0, 400.0, 10.0).english("%", 0))
            .unwrap();
        let unused = b.continuous("unused", ContinuousSpec::new("ft", 0.0, 1.0, 0.0)).unwrap();
        let angle = b.continuous("angle", ContinuousSpec::new("deg", 0.0, 90.0, 0.0)).unwrap();
        b.function("to_angle", &[slope], &[angle], Condition::Always, |i: &Inputs<'_>, o: &mut Outputs| {
            o.set_number(0, (i.number(0) / 100.0).atan().to_degrees());
        })
        .unwrap();
        let mut g = b.build(Configuration::new()).unwrap();
        g.request_outputs(&[angle]);
        (g, slope, unused, angle)
    }

    #[test]
    fn test_defaults_validate() {
        let (g, ..) = graph();
        assert_eq!(g.validate_inputs(), Ok(()));
    }

    #[test]
    fn test_blank_required_input_is_missing() {
        let (mut g, slope, ..) = graph();
        g.set_leaf_text(slope, "  ").unwrap();
        let err = g.validate_inputs().unwrap_err();
        assert_eq!(err.variable(), Some(slope));
        assert!(matches!(err, InputError::MissingRequiredInput { .. }));
    }

    #[test]
    fn test_unrequired_input_is_ignored() {
        let (mut g, _, unused, _) = graph();
        let err = g.set_leaf_text(unused, "oops").unwrap_err();
        assert!(matches!(err, GraphError::Input(_)));
        assert_eq!(g.validate_inputs(), Ok(()));
    }

    #[test]
    fn test_invalid_store_reports_span() {
        let (mut g, slope, ..) = graph();
        assert!(g.set_leaf_text(slope, "10 20 500").is_err());
        let err = g.validate_inputs().unwrap_err();
        assert_eq!(err.variable(), Some(slope));
        assert_eq!(err.span(), Some((6, 3)));
    }
}
