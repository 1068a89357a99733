//! Alert types
//!
//! Snapshots of a symbol sitting inside the breakout band, plus the
//! transitions the state machine reports.

use crate::momentum::WindowStats;
use serde::{Deserialize, Serialize};

/// An active breakout alert for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub symbol: String,
    pub current_price: f64,
    /// Percent rise from the window low
    pub change_percent: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub volume: Option<f64>,
    /// Epoch ms of the sample that opened the alert
    pub first_detected_at: i64,
    /// Epoch ms of the sample behind the last emitted snapshot
    pub last_updated_at: i64,
}

impl Alert {
    /// Open a new alert from window stats
    pub fn new(symbol: impl Into<String>, stats: &WindowStats, volume: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            current_price: stats.current_price,
            change_percent: stats.change_percent,
            min_price: stats.min_price,
            max_price: stats.max_price,
            volume,
            first_detected_at: stats.as_of,
            last_updated_at: stats.as_of,
        }
    }

    /// Refresh the snapshot in place, keeping the first detection time
    pub fn apply(&mut self, stats: &WindowStats, volume: Option<f64>) {
        self.current_price = stats.current_price;
        self.change_percent = stats.change_percent;
        self.min_price = stats.min_price;
        self.max_price = stats.max_price;
        self.volume = volume.or(self.volume);
        self.last_updated_at = stats.as_of;
    }
}

/// Record of an alert leaving the band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedAlert {
    pub symbol: String,
    /// The out-of-band change that ended the alert
    pub change_percent: f64,
    pub cleared_at: i64,
}

/// Outcome of evaluating one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum AlertTransition {
    /// Inactive -> Active
    Created(Alert),
    /// Active -> Active, moved past the hysteresis band
    Updated(Alert),
    /// Active -> Inactive
    Cleared(ClearedAlert),
}

impl AlertTransition {
    pub fn symbol(&self) -> &str {
        match self {
            AlertTransition::Created(alert) | AlertTransition::Updated(alert) => &alert.symbol,
            AlertTransition::Cleared(cleared) => &cleared.symbol,
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AlertTransition::Created(_) => "created",
            AlertTransition::Updated(_) => "updated",
            AlertTransition::Cleared(_) => "cleared",
        }
    }
}
