//! Build errors for state machine definitions.

use thiserror::Error;

/// A single defect found while validating a machine definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("state machine must include a state named \"init\"")]
    MissingInitialState,

    #[error("state `{name}` is defined more than once")]
    DuplicateState { name: String },

    #[error("transition from `{from}` to `{to}` is defined more than once")]
    DuplicateTransition { from: String, to: String },

    #[error("transition from `{from}` to `{to}` refers to undefined state `{missing}`")]
    UnknownTransitionState {
        from: String,
        to: String,
        missing: String,
    },

    #[error("timeout of state `{state}` is too large")]
    TimeoutOutOfRange { state: String },
}

/// Errors that can occur when building a state machine.
///
/// Validation does not stop at the first defect: every violation found in the
/// definition is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid state machine definition: {}", describe(.violations))]
pub struct BuildError {
    pub violations: Vec<ConfigViolation>,
}

impl BuildError {
    pub fn contains(&self, violation: &ConfigViolation) -> bool {
        self.violations.contains(violation)
    }
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_violation() {
        let error = BuildError {
            violations: vec![
                ConfigViolation::MissingInitialState,
                ConfigViolation::DuplicateState {
                    name: "lobby".to_string(),
                },
            ],
        };

        let message = error.to_string();
        assert!(message.contains("\"init\""));
        assert!(message.contains("`lobby`"));
        assert!(error.contains(&ConfigViolation::MissingInitialState));
    }
}
