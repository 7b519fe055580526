//! The action protocol returned by loop callbacks.

/// What a state's loop callback wants the machine to do next.
///
/// Actions are produced fresh on every tick and never persisted.
///
/// # Example
///
/// ```rust
/// use tickstate::core::Action;
///
/// let action = Action::transition_to("playing");
/// assert_eq!(action, Action::TransitionTo("playing".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Remain in the current state
    Stay,

    /// Leave the current state for the named target
    TransitionTo(String),

    /// End this entity's run
    Terminate,
}

impl Action {
    /// Shorthand for `Action::TransitionTo(target.into())`.
    pub fn transition_to(target: impl Into<String>) -> Self {
        Self::TransitionTo(target.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_to_accepts_str_and_string() {
        assert_eq!(
            Action::transition_to("next"),
            Action::TransitionTo("next".to_string())
        );
        assert_eq!(
            Action::transition_to(String::from("next")),
            Action::TransitionTo("next".to_string())
        );
    }
}
