//! State machine that drives entities one tick at a time.

use crate::builder::{BuildError, StateMachineBuilder};
use crate::core::{Action, InboundMessage, Position, TickContext};
use crate::definition::{StateDef, TransitionDef};
use crate::machine::error::TickError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// What the driver should do with the entity after a tick.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep the (possibly mutated) state and tick it again next time
    Continue,

    /// The entity's run is over; stop ticking it and drop its state
    Terminated,
}

struct StateEntry<S, Env> {
    def: StateDef<S, Env>,
    timeout: Option<chrono::Duration>,
}

/// Immutable machine definition shared by any number of entities.
///
/// # Example
///
/// ```rust
/// use tickstate::core::Action;
/// use tickstate::definition::{StateDef, TransitionDef};
/// use tickstate::machine::{StateMachine, TickOutcome};
///
/// type Def = StateDef<Vec<String>, ()>;
///
/// let machine = StateMachine::new(
///     vec![
///         Def::new("init", |_, _| Action::transition_to("next")),
///         Def::new("next", |_, _| Action::Terminate),
///     ],
///     vec![TransitionDef::new("init", "next", |_, log: &mut Vec<String>| {
///         log.push("init -> next".to_string())
///     })],
/// )
/// .unwrap();
///
/// let mut position = machine.start();
/// let mut log = Vec::new();
///
/// let outcome = machine.tick(&(), &mut position, &mut log, 1, &[]).unwrap();
/// assert_eq!(outcome, TickOutcome::Continue);
/// assert_eq!(position.current(), "next");
/// assert_eq!(log, vec!["init -> next"]);
///
/// let outcome = machine.tick(&(), &mut position, &mut log, 2, &[]).unwrap();
/// assert_eq!(outcome, TickOutcome::Terminated);
/// ```
pub struct StateMachine<S, Env> {
    name: String,
    states: HashMap<String, StateEntry<S, Env>>,
    transitions: HashMap<String, HashMap<String, TransitionDef<S, Env>>>,
}

impl<S, Env> StateMachine<S, Env> {
    /// Build a machine from its state and transition definitions.
    ///
    /// Fails if there is no `init` state or the definition is otherwise
    /// inconsistent.
    pub fn new(
        states: Vec<StateDef<S, Env>>,
        transitions: Vec<TransitionDef<S, Env>>,
    ) -> Result<Self, BuildError> {
        StateMachineBuilder::new()
            .states(states)
            .transitions(transitions)
            .build()
    }

    pub fn builder() -> StateMachineBuilder<S, Env> {
        StateMachineBuilder::new()
    }

    pub(crate) fn from_validated(
        name: String,
        states: Vec<StateDef<S, Env>>,
        transitions: Vec<TransitionDef<S, Env>>,
    ) -> Self {
        let states = states
            .into_iter()
            .map(|def| {
                // Out of range timeouts were rejected during validation
                let timeout = def
                    .timeout
                    .and_then(|timeout| chrono::Duration::from_std(timeout).ok());
                (def.name.clone(), StateEntry { def, timeout })
            })
            .collect();

        let mut by_source: HashMap<String, HashMap<String, TransitionDef<S, Env>>> =
            HashMap::new();
        for transition in transitions {
            by_source
                .entry(transition.from.clone())
                .or_default()
                .insert(transition.to.clone(), transition);
        }

        Self {
            name,
            states,
            transitions: by_source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fresh position for a new entity, at `init` with no expiry.
    pub fn start(&self) -> Position {
        Position::new()
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn state(&self, name: &str) -> Option<&StateDef<S, Env>> {
        self.states.get(name).map(|entry| &entry.def)
    }

    /// Registered state names, sorted.
    pub fn state_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.states.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Hook registered for the `from -> to` edge, if any.
    pub fn transition_hook(&self, from: &str, to: &str) -> Option<&TransitionDef<S, Env>> {
        self.transitions.get(from).and_then(|targets| targets.get(to))
    }

    /// Check that a position (for instance one restored from storage) names a
    /// registered state.
    pub fn validate_position(&self, position: &Position) -> Result<(), TickError> {
        self.entry(position.current()).map(|_| ())
    }

    /// Run one tick for one entity against the wall clock.
    pub fn tick(
        &self,
        env: &Env,
        position: &mut Position,
        state: &mut S,
        tick: u64,
        messages: &[InboundMessage],
    ) -> Result<TickOutcome, TickError> {
        self.tick_at(Utc::now(), env, position, state, tick, messages)
    }

    /// Run one tick for one entity as if the wall clock read `now`.
    ///
    /// The current state's loop callback is not invoked once its expiry has
    /// been reached; a `TimeoutExpired` error is returned instead and the
    /// position is left unchanged.
    pub fn tick_at(
        &self,
        now: DateTime<Utc>,
        env: &Env,
        position: &mut Position,
        state: &mut S,
        tick: u64,
        messages: &[InboundMessage],
    ) -> Result<TickOutcome, TickError> {
        let current = self.entry(position.current())?;
        let span = tracing::debug_span!("tick", machine = %self.name, tick, state = %current.def.name);
        let _guard = span.enter();

        if let Some(timeout_at) = position.expires_at() {
            if now >= timeout_at {
                warn!(%timeout_at, detected_at = %now, "state timeout expired");
                return Err(TickError::TimeoutExpired {
                    state: current.def.name.clone(),
                    timeout_at,
                    detected_at: now,
                });
            }
        }

        let ctx = TickContext::new(env, tick, messages, &current.def.name);
        match (current.def.on_loop)(&ctx, state) {
            Action::Stay => Ok(TickOutcome::Continue),
            Action::TransitionTo(target) => {
                self.apply_transition(now, &ctx, current, position, state, &target)?;
                Ok(TickOutcome::Continue)
            }
            Action::Terminate => {
                info!("state machine terminated");
                Ok(TickOutcome::Terminated)
            }
        }
    }

    /// Move an entity to `target` without running a loop callback.
    ///
    /// The expiry check is skipped, which makes this the way to recover an
    /// entity whose state timed out. Hooks run as for a regular transition
    /// but see an empty message batch.
    pub fn force_transition(
        &self,
        env: &Env,
        position: &mut Position,
        state: &mut S,
        tick: u64,
        target: &str,
    ) -> Result<(), TickError> {
        self.force_transition_at(Utc::now(), env, position, state, tick, target)
    }

    pub fn force_transition_at(
        &self,
        now: DateTime<Utc>,
        env: &Env,
        position: &mut Position,
        state: &mut S,
        tick: u64,
        target: &str,
    ) -> Result<(), TickError> {
        let current = self.entry(position.current())?;
        let span = tracing::debug_span!("tick", machine = %self.name, tick, state = %current.def.name);
        let _guard = span.enter();

        let ctx = TickContext::new(env, tick, &[], &current.def.name);
        self.apply_transition(now, &ctx, current, position, state, target)
    }

    fn entry(&self, name: &str) -> Result<&StateEntry<S, Env>, TickError> {
        self.states.get(name).ok_or_else(|| TickError::UnknownState {
            state: name.to_string(),
        })
    }

    /// Exit hook, then transition hook, then entry hook.
    ///
    /// The target is resolved after the exit and transition hooks have run.
    /// An unknown target is fatal for the entity: the position is left as it
    /// was, but the state may already have been touched by the exit hook.
    fn apply_transition(
        &self,
        now: DateTime<Utc>,
        ctx: &TickContext<'_, Env>,
        current: &StateEntry<S, Env>,
        position: &mut Position,
        state: &mut S,
        target: &str,
    ) -> Result<(), TickError> {
        let from = current.def.name.as_str();

        if let Some(on_exit) = &current.def.on_exit {
            debug!(state = from, "on_exit");
            on_exit(ctx, state);
        }

        if let Some(transition) = self.transition_hook(from, target) {
            debug!(from, to = target, "on_transition");
            (transition.on_transition)(ctx, state);
        }

        let next = self.states.get(target).ok_or_else(|| TickError::UnknownTarget {
            from: from.to_string(),
            target: target.to_string(),
        })?;

        info!(from, to = target, "state transition");

        let expires_at = next.timeout.map(|timeout| {
            now.checked_add_signed(timeout)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });
        position.enter(&next.def.name, expires_at);

        if let Some(on_enter) = &next.def.on_enter {
            debug!(state = target, "on_enter");
            on_enter(ctx, state);
        }

        Ok(())
    }
}

impl<S, Env> fmt::Debug for StateMachine<S, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transitions: usize = self.transitions.values().map(HashMap::len).sum();
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("states", &self.state_names())
            .field("transitions", &transitions)
            .finish()
    }
}
