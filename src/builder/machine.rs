//! Builder for constructing state machines.

use crate::builder::error::{BuildError, ConfigViolation};
use crate::core::INITIAL_STATE;
use crate::definition::{StateDef, TransitionDef};
use crate::machine::StateMachine;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for constructing state machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use tickstate::builder::StateMachineBuilder;
/// use tickstate::core::Action;
/// use tickstate::definition::{StateDef, TransitionDef};
///
/// type Def = StateDef<u32, ()>;
///
/// let machine = StateMachineBuilder::new()
///     .named("match")
///     .state(Def::new("init", |_, _| Action::transition_to("playing")))
///     .state(Def::new("playing", |_, score| {
///         *score += 1;
///         Action::Stay
///     }))
///     .transition(TransitionDef::<u32, ()>::new("init", "playing", |_, score| *score = 0))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.name(), "match");
/// assert!(machine.has_state("playing"));
/// ```
pub struct StateMachineBuilder<S, Env> {
    name: String,
    states: Vec<StateDef<S, Env>>,
    transitions: Vec<TransitionDef<S, Env>>,
}

impl<S, Env> StateMachineBuilder<S, Env> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            name: "state_machine".to_string(),
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Name used in log output.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a state definition.
    pub fn state(mut self, state: StateDef<S, Env>) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple state definitions at once.
    pub fn states(mut self, states: Vec<StateDef<S, Env>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Add a transition hook.
    pub fn transition(mut self, transition: TransitionDef<S, Env>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transition hooks at once.
    pub fn transitions(mut self, transitions: Vec<TransitionDef<S, Env>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Build the state machine.
    /// Returns every configuration violation found if the definition is invalid.
    pub fn build(self) -> Result<StateMachine<S, Env>, BuildError> {
        match validate(&self.states, &self.transitions) {
            Validation::Success(_) => Ok(StateMachine::from_validated(
                self.name,
                self.states,
                self.transitions,
            )),
            Validation::Failure(errors) => Err(BuildError {
                violations: errors.iter().cloned().collect(),
            }),
        }
    }
}

impl<S, Env> Default for StateMachineBuilder<S, Env> {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a definition, accumulating ALL violations.
fn validate<S, Env>(
    states: &[StateDef<S, Env>],
    transitions: &[TransitionDef<S, Env>],
) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = Vec::new();

    let mut names = HashSet::new();
    for state in states {
        if !names.insert(state.name.as_str()) {
            checks.push(Validation::fail(ConfigViolation::DuplicateState {
                name: state.name.clone(),
            }));
        }

        if let Some(timeout) = state.timeout {
            if chrono::Duration::from_std(timeout).is_err() {
                checks.push(Validation::fail(ConfigViolation::TimeoutOutOfRange {
                    state: state.name.clone(),
                }));
            }
        }
    }

    checks.push(if names.contains(INITIAL_STATE) {
        Validation::success(())
    } else {
        Validation::fail(ConfigViolation::MissingInitialState)
    });

    let mut edges = HashSet::new();
    for transition in transitions {
        if !edges.insert((transition.from.as_str(), transition.to.as_str())) {
            checks.push(Validation::fail(ConfigViolation::DuplicateTransition {
                from: transition.from.clone(),
                to: transition.to.clone(),
            }));
        }

        let mut endpoints = vec![transition.from.as_str()];
        if transition.to != transition.from {
            endpoints.push(transition.to.as_str());
        }
        for endpoint in endpoints {
            if !names.contains(endpoint) {
                checks.push(Validation::fail(ConfigViolation::UnknownTransitionState {
                    from: transition.from.clone(),
                    to: transition.to.clone(),
                    missing: endpoint.to_string(),
                }));
            }
        }
    }

    Validation::all_vec(checks).map(|_| ())
}
