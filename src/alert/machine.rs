//! Alert state machine
//!
//! Each symbol is either Inactive (no entry) or Active (an [`Alert`] in the
//! map). Window stats move a symbol between the two:
//!
//! - Inactive -> Active when the change enters `[threshold_min, threshold_max]`
//! - Active -> Active when the change moves more than `hysteresis_delta`
//!   from the last emitted value
//! - Active -> Inactive as soon as the change leaves the band
//!
//! Missing or non-finite stats never cause a transition.

use super::types::{Alert, AlertTransition, ClearedAlert};
use crate::momentum::WindowStats;
use std::collections::HashMap;

/// Thresholds for the alert band
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Lower bound of the band, inclusive (percent)
    pub threshold_min: f64,

    /// Upper bound of the band, inclusive (percent)
    pub threshold_max: f64,

    /// Minimum move in percentage points before an active alert re-emits
    pub hysteresis_delta: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold_min: 9.0,
            threshold_max: 13.0,
            hysteresis_delta: 0.5,
        }
    }
}

impl AlertConfig {
    /// Whether a change falls inside the band
    pub fn contains(&self, change_percent: f64) -> bool {
        change_percent >= self.threshold_min && change_percent <= self.threshold_max
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.threshold_min.is_finite() || !self.threshold_max.is_finite() {
            anyhow::bail!("alert thresholds must be finite");
        }
        if self.threshold_min > self.threshold_max {
            anyhow::bail!(
                "threshold_min ({}) exceeds threshold_max ({})",
                self.threshold_min,
                self.threshold_max
            );
        }
        if !self.hysteresis_delta.is_finite() || self.hysteresis_delta < 0.0 {
            anyhow::bail!("hysteresis_delta must be a non-negative number");
        }
        Ok(())
    }
}

/// Owns the set of active alerts, keyed by symbol
#[derive(Debug)]
pub struct AlertStateMachine {
    config: AlertConfig,
    active: HashMap<String, Alert>,
}

impl AlertStateMachine {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            active: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(AlertConfig::default())
    }

    /// Evaluate fresh window stats for a symbol
    ///
    /// Returns the transition to broadcast, if any. Changes inside the
    /// hysteresis band leave the stored alert (and its baseline) as it was.
    pub fn evaluate(
        &mut self,
        symbol: &str,
        stats: Option<&WindowStats>,
        volume: Option<f64>,
    ) -> Option<AlertTransition> {
        let stats = stats?;
        if !stats.change_percent.is_finite() {
            return None;
        }

        if !self.config.contains(stats.change_percent) {
            let alert = self.active.remove(symbol)?;
            tracing::info!(
                symbol,
                change_percent = stats.change_percent,
                held_ms = stats.as_of - alert.first_detected_at,
                "Momentum alert cleared"
            );
            return Some(AlertTransition::Cleared(ClearedAlert {
                symbol: alert.symbol,
                change_percent: stats.change_percent,
                cleared_at: stats.as_of,
            }));
        }

        if let Some(alert) = self.active.get_mut(symbol) {
            let delta = (stats.change_percent - alert.change_percent).abs();
            if delta <= self.config.hysteresis_delta {
                tracing::trace!(symbol, delta, "Change within hysteresis band");
                return None;
            }

            alert.apply(stats, volume);
            tracing::debug!(
                symbol,
                change_percent = stats.change_percent,
                delta,
                "Momentum alert updated"
            );
            return Some(AlertTransition::Updated(alert.clone()));
        }

        let alert = Alert::new(symbol, stats, volume);
        tracing::info!(
            symbol,
            change_percent = stats.change_percent,
            price = stats.current_price,
            low = stats.min_price,
            "Momentum alert created"
        );
        self.active.insert(symbol.to_string(), alert.clone());
        Some(AlertTransition::Created(alert))
    }

    /// Active alerts, strongest move first
    pub fn active_alerts(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self.active.values().cloned().collect();
        alerts.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
        alerts
    }

    pub fn get(&self, symbol: &str) -> Option<&Alert> {
        self.active.get(symbol)
    }

    pub fn is_active(&self, symbol: &str) -> bool {
        self.active.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}
