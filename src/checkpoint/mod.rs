//! Checkpoint and resume support for entities.
//!
//! The machine never persists anything itself. A driver that wants entities
//! to survive a restart snapshots each one as a [`Checkpoint`], stores the
//! JSON or binary encoding wherever it likes, and restores it later against
//! the same machine definition.

use crate::core::Position;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of one entity: its position and opaque state.
/// Does NOT include callbacks (not serializable).
///
/// # Example
///
/// ```rust
/// use tickstate::checkpoint::Checkpoint;
/// use tickstate::core::Position;
/// use uuid::Uuid;
///
/// let checkpoint = Checkpoint::new(Uuid::new_v4(), Position::new(), vec![1u8, 2, 3]);
/// let json = checkpoint.to_json().unwrap();
/// let restored: Checkpoint<Vec<u8>> = Checkpoint::from_json(&json).unwrap();
///
/// assert_eq!(restored.state, vec![1, 2, 3]);
/// assert_eq!(restored.position.current(), "init");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// Entity this checkpoint belongs to
    pub entity: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Current state name and expiry
    pub position: Position,

    /// Caller-owned state
    pub state: S,
}

impl<S> Checkpoint<S> {
    pub fn new(entity: Uuid, position: Position, state: S) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            entity,
            timestamp: Utc::now(),
            position,
            state,
        }
    }

    pub(crate) fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(self)
    }
}

impl<S: Serialize> Checkpoint<S> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::encode("json", e))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::encode("bincode", e))
    }
}

impl<S: DeserializeOwned> Checkpoint<S> {
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json).map_err(|e| CheckpointError::decode("json", e))?;
        checkpoint.check_version()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes).map_err(|e| CheckpointError::decode("bincode", e))?;
        checkpoint.check_version()
    }
}
