//! Tickstate: a tick-driven state machine engine
//!
//! Tickstate drives per-entity server-side behavior (one match, one lobby,
//! one session) through a set of named states, one discrete tick at a time.
//! The machine definition is immutable and shared; every entity carries its
//! own [`Position`] and an opaque state value the engine never inspects.
//!
//! # Core Concepts
//!
//! - **StateDef**: a named state with a loop callback, optional entry/exit
//!   hooks and an optional timeout
//! - **TransitionDef**: an optional hook fired on one specific `from -> to` edge
//! - **Action**: what a loop callback asks for: stay, transition, terminate
//! - **Position**: the current state name and expiry, one per entity
//! - **Driver**: a reference scheduler that ticks many entities and recovers
//!   from timeouts
//!
//! # Example
//!
//! ```rust
//! use tickstate::{Action, StateDef, StateMachine, TickOutcome, TransitionDef};
//! use std::time::Duration;
//!
//! type Def = StateDef<Vec<String>, ()>;
//!
//! let machine = StateMachine::new(
//!     vec![
//!         Def::new("init", |_, _| Action::transition_to("waiting")),
//!         Def::new("waiting", |ctx, players| {
//!             players.extend(ctx.messages.iter().map(|m| m.sender.clone()));
//!             if players.len() >= 2 {
//!                 Action::Terminate
//!             } else {
//!                 Action::Stay
//!             }
//!         })
//!         .timeout(Duration::from_secs(30)),
//!     ],
//!     vec![TransitionDef::new("init", "waiting", |_, players: &mut Vec<String>| {
//!         players.clear()
//!     })],
//! )
//! .unwrap();
//!
//! let mut position = machine.start();
//! let mut players = Vec::new();
//!
//! let outcome = machine.tick(&(), &mut position, &mut players, 1, &[]).unwrap();
//! assert_eq!(outcome, TickOutcome::Continue);
//! assert_eq!(position.current(), "waiting");
//! assert!(position.expires_at().is_some());
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod definition;
pub mod driver;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use core::{Action, InboundMessage, Position, TickContext, INITIAL_STATE};
pub use definition::{StateDef, TransitionDef};
pub use driver::{Driver, EntityOutcome, TimeoutPolicy};
pub use machine::{StateMachine, TickError, TickOutcome};
