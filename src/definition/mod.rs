//! Immutable state and transition definitions.
//!
//! Definitions are built once, handed to the machine at construction and
//! never mutated afterwards. Callbacks are stored behind `Arc` so a
//! definition can be cloned cheaply and shared across threads.

mod state;
mod transition;

pub use state::{HookFn, LoopFn, StateDef};
pub use transition::TransitionDef;
