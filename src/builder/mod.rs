//! Builder API for state machine construction.
//!
//! Construction is the only place configuration defects can surface. The
//! builder validates the whole definition and reports every violation at
//! once as a [`BuildError`]; a machine that builds can never fault on a
//! missing `init` state.

pub mod error;
pub mod machine;

pub use error::{BuildError, ConfigViolation};
pub use machine::StateMachineBuilder;
