//! Alert lifecycle module
//!
//! Turns window stats into create/update/clear transitions for symbols
//! whose rise from the window low sits inside the configured band.

mod machine;
mod types;

pub use machine::{AlertConfig, AlertStateMachine};
pub use types::{Alert, AlertTransition, ClearedAlert};
