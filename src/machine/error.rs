//! Errors returned from a tick.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while ticking an entity.
///
/// `TimeoutExpired` is an ordinary runtime condition the driver is expected to
/// recover from. The other variants indicate a defect in the machine
/// definition or in a persisted position and are fatal for the entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    #[error("state `{state}` with timeout at {timeout_at} expired at {detected_at}")]
    TimeoutExpired {
        state: String,
        timeout_at: DateTime<Utc>,
        detected_at: DateTime<Utc>,
    },

    #[error("attempt to transition from `{from}` to nonexistent state `{target}`")]
    UnknownTarget { from: String, target: String },

    #[error("position refers to nonexistent state `{state}`")]
    UnknownState { state: String },
}

impl TickError {
    /// Whether the entity cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        !self.is_timeout()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutExpired { .. })
    }
}
