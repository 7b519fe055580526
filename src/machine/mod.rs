//! The tick engine.
//!
//! A [`StateMachine`] holds only immutable definitions. Each entity carries
//! its own [`Position`](crate::core::Position) and opaque state, and the
//! driver hands both to [`StateMachine::tick`] once per tick.

mod engine;
mod error;

pub use engine::{StateMachine, TickOutcome};
pub use error::TickError;
