//! Core value types of the tick engine.
//!
//! - `Action` returned by loop callbacks
//! - `Position` carried per entity between ticks
//! - `TickContext` and `InboundMessage` handed to callbacks
//!
//! Nothing here performs I/O or reads the clock.

mod action;
mod context;
mod position;

pub use action::Action;
pub use context::{InboundMessage, TickContext};
pub use position::{Position, INITIAL_STATE};
