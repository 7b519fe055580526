//! Reference tick driver for many entities sharing one machine.
//!
//! The machine itself never schedules anything. A `Driver` owns a set of
//! entities, ticks each of them once per call in entity id order, applies a
//! [`TimeoutPolicy`] when a state expires and drops entities that terminate
//! or fault.

mod policy;

pub use policy::{EntityOutcome, Recovery, TimeoutPolicy};

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::core::{InboundMessage, Position};
use crate::machine::{StateMachine, TickError, TickOutcome};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

pub type EntityId = Uuid;

/// Errors returned by driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no entity with id {0}")]
    UnknownEntity(EntityId),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// One running entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity<S> {
    pub position: Position,
    pub state: S,
}

/// Ticks a collection of entities against a shared machine definition.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use tickstate::core::Action;
/// use tickstate::definition::StateDef;
/// use tickstate::driver::{Driver, EntityOutcome};
/// use tickstate::machine::StateMachine;
///
/// type Def = StateDef<u32, ()>;
///
/// let machine = StateMachine::new(
///     vec![Def::new("init", |_, ticks| {
///         *ticks += 1;
///         if *ticks == 2 { Action::Terminate } else { Action::Stay }
///     })],
///     vec![],
/// )
/// .unwrap();
///
/// let mut driver = Driver::new(Arc::new(machine));
/// let id = driver.spawn(0);
///
/// let outcomes = driver.tick_all(&(), 1, &HashMap::new());
/// assert_eq!(outcomes, vec![(id, EntityOutcome::Running)]);
///
/// let outcomes = driver.tick_all(&(), 2, &HashMap::new());
/// assert_eq!(outcomes, vec![(id, EntityOutcome::Terminated)]);
/// assert!(driver.is_empty());
/// ```
pub struct Driver<S, Env> {
    machine: Arc<StateMachine<S, Env>>,
    entities: BTreeMap<EntityId, Entity<S>>,
    timeout_policy: TimeoutPolicy,
}

impl<S, Env> Driver<S, Env> {
    pub fn new(machine: Arc<StateMachine<S, Env>>) -> Self {
        Self {
            machine,
            entities: BTreeMap::new(),
            timeout_policy: TimeoutPolicy::default(),
        }
    }

    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    pub fn machine(&self) -> &Arc<StateMachine<S, Env>> {
        &self.machine
    }

    /// Start a new entity at `init` with the given state.
    pub fn spawn(&mut self, state: S) -> EntityId {
        let id = Uuid::new_v4();
        self.entities.insert(
            id,
            Entity {
                position: self.machine.start(),
                state,
            },
        );
        info!(machine = self.machine.name(), entity = %id, "entity spawned");
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity<S>> {
        self.entities.get(&id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity<S>> {
        self.entities.remove(&id)
    }

    /// Ids of all live entities, in tick order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Tick every entity once against the wall clock.
    ///
    /// Each entity receives its own batch from `inbox`, in the order given;
    /// entities with no entry get an empty batch.
    pub fn tick_all(
        &mut self,
        env: &Env,
        tick: u64,
        inbox: &HashMap<EntityId, Vec<InboundMessage>>,
    ) -> Vec<(EntityId, EntityOutcome)> {
        self.tick_all_at(Utc::now(), env, tick, inbox)
    }

    pub fn tick_all_at(
        &mut self,
        now: DateTime<Utc>,
        env: &Env,
        tick: u64,
        inbox: &HashMap<EntityId, Vec<InboundMessage>>,
    ) -> Vec<(EntityId, EntityOutcome)> {
        let mut outcomes = Vec::with_capacity(self.entities.len());
        for id in self.ids() {
            let messages = inbox.get(&id).map(Vec::as_slice).unwrap_or(&[]);
            match self.tick_entity_at(now, env, id, tick, messages) {
                Ok(outcome) => outcomes.push((id, outcome)),
                // Unreachable: ids come from the live set and only the ticked
                // entity can be removed
                Err(error) => error!(entity = %id, %error, "entity vanished during tick_all"),
            }
        }
        outcomes
    }

    /// Tick a single entity against the wall clock.
    pub fn tick_entity(
        &mut self,
        env: &Env,
        id: EntityId,
        tick: u64,
        messages: &[InboundMessage],
    ) -> Result<EntityOutcome, DriverError> {
        self.tick_entity_at(Utc::now(), env, id, tick, messages)
    }

    pub fn tick_entity_at(
        &mut self,
        now: DateTime<Utc>,
        env: &Env,
        id: EntityId,
        tick: u64,
        messages: &[InboundMessage],
    ) -> Result<EntityOutcome, DriverError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(DriverError::UnknownEntity(id))?;

        let result = self.machine.tick_at(
            now,
            env,
            &mut entity.position,
            &mut entity.state,
            tick,
            messages,
        );

        let outcome = match result {
            Ok(TickOutcome::Continue) => EntityOutcome::Running,
            Ok(TickOutcome::Terminated) => {
                info!(entity = %id, tick, "entity terminated");
                EntityOutcome::Terminated
            }
            Err(error) if error.is_timeout() => recover(
                &self.machine,
                &self.timeout_policy,
                now,
                env,
                entity,
                tick,
                error,
            ),
            Err(error) => EntityOutcome::Faulted(error),
        };

        match &outcome {
            EntityOutcome::TimedOut { error, recovery } => {
                warn!(entity = %id, tick, %error, ?recovery, "entity timed out");
            }
            EntityOutcome::Faulted(error) => {
                error!(entity = %id, tick, %error, "entity faulted");
            }
            EntityOutcome::Running | EntityOutcome::Terminated => {}
        }

        if outcome.is_removed() {
            self.entities.remove(&id);
        }
        Ok(outcome)
    }

    /// Snapshot one entity for persistence.
    pub fn checkpoint(&self, id: EntityId) -> Result<Checkpoint<S>, DriverError>
    where
        S: Clone,
    {
        let entity = self.entities.get(&id).ok_or(DriverError::UnknownEntity(id))?;
        Ok(Checkpoint::new(id, entity.position.clone(), entity.state.clone()))
    }

    /// Bring a persisted entity back under this driver.
    ///
    /// The checkpoint must carry the current format version and its position
    /// must name a state of this driver's machine.
    /// An existing entity with the same id is replaced.
    pub fn restore(&mut self, checkpoint: Checkpoint<S>) -> Result<EntityId, DriverError> {
        let checkpoint = checkpoint.check_version()?;
        let id = checkpoint.entity;
        if self.machine.validate_position(&checkpoint.position).is_err() {
            return Err(CheckpointError::ValidationFailed {
                entity: id,
                state: checkpoint.position.current().to_string(),
            }
            .into());
        }

        self.entities.insert(
            id,
            Entity {
                position: checkpoint.position,
                state: checkpoint.state,
            },
        );
        info!(machine = self.machine.name(), entity = %id, "entity restored");
        Ok(id)
    }
}

fn recover<S, Env>(
    machine: &StateMachine<S, Env>,
    policy: &TimeoutPolicy,
    now: DateTime<Utc>,
    env: &Env,
    entity: &mut Entity<S>,
    tick: u64,
    error: TickError,
) -> EntityOutcome {
    let recovery = match policy {
        TimeoutPolicy::Terminate => Recovery::Terminated,
        TimeoutPolicy::Report => Recovery::Reported,
        TimeoutPolicy::ForceTransition(target) => {
            if let Err(fault) = machine.force_transition_at(
                now,
                env,
                &mut entity.position,
                &mut entity.state,
                tick,
                target,
            ) {
                return EntityOutcome::Faulted(fault);
            }
            Recovery::Transitioned(target.clone())
        }
    };
    EntityOutcome::TimedOut { error, recovery }
}
