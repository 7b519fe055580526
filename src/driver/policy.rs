//! Timeout recovery policies and per-entity outcomes.

use crate::machine::TickError;

/// What the driver does with an entity whose current state timed out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Drop the entity
    #[default]
    Terminate,

    /// Move the entity to the named state, running the usual hooks
    ForceTransition(String),

    /// Leave the entity where it is; it keeps reporting the timeout every tick
    Report,
}

/// How a timed out entity was recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    Terminated,
    Transitioned(String),
    Reported,
}

/// Result of ticking one entity through the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    /// Entity keeps running
    Running,

    /// Entity ended its own run and was removed
    Terminated,

    /// Entity's state expired and the timeout policy was applied
    TimedOut { error: TickError, recovery: Recovery },

    /// Entity hit a fatal error and was removed
    Faulted(TickError),
}

impl EntityOutcome {
    /// Whether the driver dropped the entity after this outcome.
    pub fn is_removed(&self) -> bool {
        match self {
            Self::Running => false,
            Self::Terminated | Self::Faulted(_) => true,
            Self::TimedOut { recovery, .. } => *recovery == Recovery::Terminated,
        }
    }
}
