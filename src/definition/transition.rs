//! Transition hooks keyed by an ordered `(from, to)` pair.

use crate::core::TickContext;
use crate::definition::state::HookFn;
use std::fmt;
use std::sync::Arc;

/// A hook fired when the machine moves from one specific state to another.
///
/// Transition definitions never gate reachability: a loop callback may target
/// any registered state, and the hook simply runs if one is registered for
/// that edge.
pub struct TransitionDef<S, Env> {
    pub from: String,
    pub to: String,
    pub on_transition: HookFn<S, Env>,
}

impl<S, Env> TransitionDef<S, Env> {
    pub fn new<F>(from: impl Into<String>, to: impl Into<String>, on_transition: F) -> Self
    where
        F: Fn(&TickContext<'_, Env>, &mut S) + Send + Sync + 'static,
    {
        Self {
            from: from.into(),
            to: to.into(),
            on_transition: Arc::new(on_transition),
        }
    }
}

impl<S, Env> Clone for TransitionDef<S, Env> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            on_transition: Arc::clone(&self.on_transition),
        }
    }
}

impl<S, Env> fmt::Debug for TransitionDef<S, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionDef")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}
