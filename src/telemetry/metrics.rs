//! Prometheus metrics
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! every call is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

const CYCLE_DURATION: &str = "scanner_cycle_duration_ms";
const ALERT_TRANSITIONS: &str = "scanner_alert_transitions_total";

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Alerts currently in the band
    ActiveAlerts,
    /// Symbols with retained window history
    TrackedSymbols,
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::ActiveAlerts => "scanner_active_alerts",
            GaugeMetric::TrackedSymbols => "scanner_tracked_symbols",
        }
    }
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Symbols skipped in a cycle (fetch error, timeout, bad sample)
    FetchFailures,
    /// Events lost to a full subscriber queue
    BroadcastDropped,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::FetchFailures => "scanner_fetch_failures_total",
            CounterMetric::BroadcastDropped => "scanner_broadcast_dropped_total",
        }
    }
}

/// Record how long a scan cycle took
pub fn record_cycle_duration(duration: Duration) {
    metrics::histogram!(CYCLE_DURATION).record(duration.as_secs_f64() * 1000.0);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

pub fn increment_counter(metric: CounterMetric, by: u64) {
    metrics::counter!(metric.name()).increment(by);
}

/// Count an alert transition, labelled `created`, `updated` or `cleared`
pub fn record_alert_transition(kind: &'static str) {
    metrics::counter!(ALERT_TRANSITIONS, "kind" => kind).increment(1);
}

/// Install the Prometheus recorder and serve `/metrics` on `port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    metrics::describe_histogram!(CYCLE_DURATION, "Wall time of one scan cycle in milliseconds");
    metrics::describe_gauge!(GaugeMetric::ActiveAlerts.name(), "Alerts currently active");
    metrics::describe_gauge!(
        GaugeMetric::TrackedSymbols.name(),
        "Symbols with samples in the window"
    );
    metrics::describe_counter!(
        CounterMetric::FetchFailures.name(),
        "Symbols skipped because the fetch or sample failed"
    );
    metrics::describe_counter!(
        CounterMetric::BroadcastDropped.name(),
        "Events dropped for a slow subscriber"
    );
    metrics::describe_counter!(ALERT_TRANSITIONS, "Alert state transitions by kind");

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}
