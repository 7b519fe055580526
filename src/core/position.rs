//! Per-entity execution position.
//!
//! A machine definition is shared and immutable; what moves is the position,
//! one per entity, threaded by the caller through every tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the mandatory entry state.
pub const INITIAL_STATE: &str = "init";

/// The current state name plus the optional instant at which it expires.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{Position, INITIAL_STATE};
///
/// let position = Position::new();
/// assert_eq!(position.current(), INITIAL_STATE);
/// assert!(position.expires_at().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    current: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// Position at the `init` state with no expiry.
    pub fn new() -> Self {
        Self {
            current: INITIAL_STATE.to_string(),
            expires_at: None,
        }
    }

    /// Name of the state this entity is in.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Instant at which the current state times out, if it declares a timeout.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the expiry has been reached at `now`.
    ///
    /// Reaching the expiry instant exactly counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub(crate) fn enter(&mut self, state: &str, expires_at: Option<DateTime<Utc>>) {
        self.current = state.to_string();
        self.expires_at = expires_at;
    }
}
