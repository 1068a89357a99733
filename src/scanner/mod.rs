//! Scanner module
//!
//! Periodic polling of all configured sources, feeding the momentum
//! pipeline and reporting per-cycle statistics.

mod orchestrator;
mod stats;

pub use orchestrator::{ScanOrchestrator, ScannerHandle};
pub use stats::{CycleStats, ScanStats};
