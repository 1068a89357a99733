//! Sliding-window price tracking
//!
//! Keeps, per symbol, every sample inside the trailing time window and
//! measures the latest price against the window minimum. Measuring from the
//! local bottom rather than the oldest sample means a dip-and-recover is
//! scored as a breakout from the dip.

use crate::feed::{validate_price, SampleError};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Default trailing window (2 minutes)
pub const DEFAULT_WINDOW_MS: i64 = 120_000;

/// Default minimum samples before a window produces stats
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// Configuration for the sliding window
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Trailing window length in milliseconds
    pub window_ms: i64,

    /// Samples required before stats are reported
    pub min_samples_for_signal: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            min_samples_for_signal: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Statistics over one symbol's current window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStats {
    /// Most recent price in the window
    pub current_price: f64,
    /// `(current - min) / min * 100`
    pub change_percent: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub sample_count: usize,
    /// Timestamp of the most recent sample (epoch ms)
    pub as_of: i64,
}

#[derive(Debug, Clone, Copy)]
struct PricePoint {
    timestamp: i64,
    price: f64,
}

/// Per-symbol trailing price windows
pub struct SlidingWindowTracker {
    config: WindowConfig,
    histories: HashMap<String, VecDeque<PricePoint>>,
}

impl SlidingWindowTracker {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            histories: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(WindowConfig::default())
    }

    /// Record a price and return the window stats, if the window is warm
    ///
    /// The sample's own timestamp is "now" for pruning. Samples older than
    /// the newest retained sample are refused; an exact replay of the newest
    /// sample is absorbed without adding a second data point.
    pub fn record(
        &mut self,
        symbol: &str,
        price: f64,
        timestamp: i64,
    ) -> Result<Option<WindowStats>, SampleError> {
        validate_price(symbol, price)?;
        if timestamp <= 0 {
            return Err(SampleError::InvalidTimestamp {
                symbol: symbol.to_string(),
                timestamp,
            });
        }

        let history = self.histories.entry(symbol.to_string()).or_default();

        match history.back() {
            Some(last) if timestamp < last.timestamp => {
                return Err(SampleError::OutOfOrder {
                    symbol: symbol.to_string(),
                    timestamp,
                    latest: last.timestamp,
                });
            }
            Some(last) if timestamp == last.timestamp && price == last.price => {
                tracing::trace!(symbol, timestamp, "Duplicate sample ignored");
            }
            _ => history.push_back(PricePoint { timestamp, price }),
        }

        // Remove old prices outside window
        let cutoff = timestamp - self.config.window_ms;
        while let Some(point) = history.front() {
            if point.timestamp <= cutoff {
                history.pop_front();
            } else {
                break;
            }
        }

        Ok(Self::compute(history, self.config.min_samples_for_signal))
    }

    /// Stats for a symbol without recording anything
    pub fn stats(&self, symbol: &str) -> Option<WindowStats> {
        self.histories
            .get(symbol)
            .and_then(|h| Self::compute(h, self.config.min_samples_for_signal))
    }

    fn compute(history: &VecDeque<PricePoint>, min_samples: usize) -> Option<WindowStats> {
        if history.len() < min_samples.max(1) {
            return None;
        }

        let current = history.back()?;
        let (min_price, max_price) = history
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.price), hi.max(p.price))
            });

        Some(WindowStats {
            current_price: current.price,
            change_percent: (current.price - min_price) / min_price * 100.0,
            min_price,
            max_price,
            sample_count: history.len(),
            as_of: current.timestamp,
        })
    }

    /// Prune every history against `now` and drop symbols with nothing left
    ///
    /// Returns the number of symbols evicted.
    pub fn evict_idle(&mut self, now: i64) -> usize {
        let cutoff = now - self.config.window_ms;
        let before = self.histories.len();

        self.histories.retain(|_, history| {
            while history.front().is_some_and(|p| p.timestamp <= cutoff) {
                history.pop_front();
            }
            !history.is_empty()
        });

        before - self.histories.len()
    }

    /// Forget a symbol entirely
    pub fn remove(&mut self, symbol: &str) -> bool {
        self.histories.remove(symbol).is_some()
    }

    /// Number of symbols with retained history
    pub fn symbol_count(&self) -> usize {
        self.histories.len()
    }

    /// Number of retained samples for a symbol
    pub fn sample_count(&self, symbol: &str) -> usize {
        self.histories.get(symbol).map_or(0, VecDeque::len)
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        self.histories.clear();
    }
}
