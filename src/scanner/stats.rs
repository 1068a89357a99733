//! Scan statistics

use crate::alert::AlertTransition;
use serde::{Deserialize, Serialize};

/// Outcome of a single scan cycle, broadcast as the `stats` event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStats {
    /// Symbols scheduled this cycle
    pub total: usize,
    pub active_alerts: usize,
    pub scan_duration_ms: u64,
    /// Samples that reached the window tracker
    pub processed: usize,
    /// Symbols whose fetch or sample was rejected
    pub failed: usize,
}

/// Lifetime counters across all cycles
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanStats {
    pub cycles: u64,
    pub samples_processed: u64,
    pub fetch_failures: u64,
    pub alerts_created: u64,
    pub alerts_updated: u64,
    pub alerts_cleared: u64,
    pub last_cycle: Option<CycleStats>,
}

impl ScanStats {
    /// Fold a finished cycle into the totals
    pub fn record_cycle(&mut self, cycle: CycleStats) {
        self.cycles += 1;
        self.samples_processed += cycle.processed as u64;
        self.fetch_failures += cycle.failed as u64;
        self.last_cycle = Some(cycle);
    }

    pub fn record_transition(&mut self, transition: &AlertTransition) {
        match transition {
            AlertTransition::Created(_) => self.alerts_created += 1,
            AlertTransition::Updated(_) => self.alerts_updated += 1,
            AlertTransition::Cleared(_) => self.alerts_cleared += 1,
        }
    }
}
