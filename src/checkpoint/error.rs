//! Checkpoint error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while saving or restoring an entity
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to encode checkpoint as {format}: {reason}")]
    SerializationFailed { format: &'static str, reason: String },

    #[error("failed to decode {format} checkpoint: {reason}")]
    DeserializationFailed { format: &'static str, reason: String },

    #[error("unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint names a state the machine it is restored into does not have
    #[error("checkpoint of entity {entity} is at unknown state `{state}`")]
    ValidationFailed { entity: Uuid, state: String },
}

impl CheckpointError {
    pub(crate) fn encode(format: &'static str, reason: impl ToString) -> Self {
        Self::SerializationFailed {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode(format: &'static str, reason: impl ToString) -> Self {
        Self::DeserializationFailed {
            format,
            reason: reason.to_string(),
        }
    }
}
