//! Named state definitions.

use crate::core::{Action, TickContext};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Entry, exit and transition hook signature.
pub type HookFn<S, Env> = Arc<dyn Fn(&TickContext<'_, Env>, &mut S) + Send + Sync>;

/// Loop callback signature. Runs once per tick while the state is current.
pub type LoopFn<S, Env> = Arc<dyn Fn(&TickContext<'_, Env>, &mut S) -> Action + Send + Sync>;

/// Immutable description of one named state.
///
/// The loop callback is mandatory; entry and exit hooks and the timeout are
/// optional.
///
/// # Example
///
/// ```rust
/// use tickstate::core::Action;
/// use tickstate::definition::StateDef;
/// use std::time::Duration;
///
/// let lobby = StateDef::<Vec<String>, ()>::new("lobby", |ctx, players| {
///     for message in ctx.messages {
///         players.push(message.sender.clone());
///     }
///     if players.len() >= 2 {
///         Action::transition_to("playing")
///     } else {
///         Action::Stay
///     }
/// })
/// .timeout(Duration::from_secs(30));
///
/// assert_eq!(lobby.timeout, Some(Duration::from_secs(30)));
/// ```
pub struct StateDef<S, Env> {
    pub name: String,
    pub on_enter: Option<HookFn<S, Env>>,
    pub on_loop: LoopFn<S, Env>,
    pub on_exit: Option<HookFn<S, Env>>,
    pub timeout: Option<Duration>,
}

impl<S, Env> StateDef<S, Env> {
    pub fn new<F>(name: impl Into<String>, on_loop: F) -> Self
    where
        F: Fn(&TickContext<'_, Env>, &mut S) -> Action + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            on_enter: None,
            on_loop: Arc::new(on_loop),
            on_exit: None,
            timeout: None,
        }
    }

    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TickContext<'_, Env>, &mut S) + Send + Sync + 'static,
    {
        self.on_enter = Some(Arc::new(hook));
        self
    }

    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TickContext<'_, Env>, &mut S) + Send + Sync + 'static,
    {
        self.on_exit = Some(Arc::new(hook));
        self
    }

    /// Set how long the state may stay current once entered.
    ///
    /// A zero duration means no timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }
}

impl<S, Env> Clone for StateDef<S, Env> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            on_enter: self.on_enter.clone(),
            on_loop: Arc::clone(&self.on_loop),
            on_exit: self.on_exit.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S, Env> fmt::Debug for StateDef<S, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDef")
            .field("name", &self.name)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Def = StateDef<u32, ()>;

    #[test]
    fn zero_timeout_means_none() {
        let state = Def::new("waiting", |_, _| Action::Stay).timeout(Duration::ZERO);
        assert!(state.timeout.is_none());

        let state = state.timeout(Duration::from_millis(500));
        assert_eq!(state.timeout, Some(Duration::from_millis(500)));
    }

    #[test]
    fn hooks_are_optional() {
        let state = Def::new("init", |_, _| Action::Stay);
        assert!(state.on_enter.is_none());
        assert!(state.on_exit.is_none());

        let state = state.on_enter(|_, n| *n += 1).on_exit(|_, n| *n += 10);
        assert!(state.on_enter.is_some());
        assert!(state.on_exit.is_some());
    }

    #[test]
    fn clone_shares_callbacks() {
        let state = Def::new("init", |_, n| {
            *n += 1;
            Action::Stay
        });
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.on_loop, &cloned.on_loop));
        assert_eq!(cloned.name, "init");
    }

    #[test]
    fn loop_callback_sees_context() {
        let state = Def::new("init", |ctx, n| {
            *n = ctx.tick as u32;
            Action::transition_to("next")
        });

        let mut n = 0;
        let ctx = TickContext::new(&(), 42, &[], "init");
        let action = (state.on_loop)(&ctx, &mut n);

        assert_eq!(n, 42);
        assert_eq!(action, Action::transition_to("next"));
    }
}
