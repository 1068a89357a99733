//! Configuration types for momentum-scanner

use crate::alert::AlertConfig;
use crate::broadcast::DEFAULT_SUBSCRIBER_BUFFER;
use crate::momentum::{WindowConfig, DEFAULT_MIN_SAMPLES, DEFAULT_WINDOW_MS};
use crate::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Scan loop, window and alert band settings
///
/// Keys are snake_case; the camelCase spellings are accepted too.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    /// Lower edge of the alert band (percent)
    #[serde(default = "default_threshold_min", alias = "thresholdMin")]
    pub threshold_min: f64,

    /// Upper edge of the alert band (percent)
    #[serde(default = "default_threshold_max", alias = "thresholdMax")]
    pub threshold_max: f64,

    /// Trailing window length in milliseconds
    #[serde(default = "default_window_ms", alias = "windowMs")]
    pub window_ms: u64,

    /// Points of change an active alert must move before re-emitting
    #[serde(default = "default_hysteresis_delta", alias = "hysteresisDelta")]
    pub hysteresis_delta: f64,

    #[serde(default = "default_scan_interval_ms", alias = "scanIntervalMs")]
    pub scan_interval_ms: u64,

    /// Samples needed in the window before stats are reported
    #[serde(default = "default_min_samples", alias = "minSamplesForSignal")]
    pub min_samples_for_signal: usize,

    /// Concurrent fetches per cycle
    #[serde(default = "default_fetch_concurrency", alias = "fetchConcurrency")]
    pub fetch_concurrency: usize,

    #[serde(default = "default_fetch_timeout_ms", alias = "fetchTimeoutMs")]
    pub fetch_timeout_ms: u64,
}

fn default_threshold_min() -> f64 {
    9.0
}
fn default_threshold_max() -> f64 {
    13.0
}
fn default_window_ms() -> u64 {
    DEFAULT_WINDOW_MS as u64
}
fn default_hysteresis_delta() -> f64 {
    0.5
}
fn default_scan_interval_ms() -> u64 {
    10_000
}
fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}
fn default_fetch_concurrency() -> usize {
    16
}
fn default_fetch_timeout_ms() -> u64 {
    10_000
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            threshold_min: default_threshold_min(),
            threshold_max: default_threshold_max(),
            window_ms: default_window_ms(),
            hysteresis_delta: default_hysteresis_delta(),
            scan_interval_ms: default_scan_interval_ms(),
            min_samples_for_signal: default_min_samples(),
            fetch_concurrency: default_fetch_concurrency(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl ScannerConfig {
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            threshold_min: self.threshold_min,
            threshold_max: self.threshold_max,
            hysteresis_delta: self.hysteresis_delta,
        }
    }

    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            window_ms: i64::try_from(self.window_ms).unwrap_or(i64::MAX),
            min_samples_for_signal: self.min_samples_for_signal,
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Market data provider
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Binance,
    Coingecko,
    Yahoo,
}

/// One `[[sources]]` entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub kind: SourceKind,

    #[serde(default)]
    pub symbols: Vec<String>,

    /// Override the provider's API root, e.g. for a proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Dashboard WebSocket server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-subscriber event queue depth
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}
fn default_subscriber_buffer() -> usize {
    DEFAULT_SUBSCRIBER_BUFFER
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this port when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject settings the scanner cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        let scanner = &self.scanner;
        scanner.alert_config().validate()?;

        if scanner.window_ms == 0 {
            anyhow::bail!("scanner.window_ms must be greater than zero");
        }
        if scanner.scan_interval_ms == 0 {
            anyhow::bail!("scanner.scan_interval_ms must be greater than zero");
        }
        if scanner.min_samples_for_signal == 0 {
            anyhow::bail!("scanner.min_samples_for_signal must be at least 1");
        }
        if scanner.fetch_concurrency == 0 {
            anyhow::bail!("scanner.fetch_concurrency must be at least 1");
        }
        if scanner.fetch_timeout_ms == 0 {
            anyhow::bail!("scanner.fetch_timeout_ms must be greater than zero");
        }
        if self.server.subscriber_buffer == 0 {
            anyhow::bail!("server.subscriber_buffer must be at least 1");
        }

        Ok(())
    }

    /// Total symbols across all sources
    pub fn symbol_count(&self) -> usize {
        self.sources.iter().map(|s| s.symbols.len()).sum()
    }
}
