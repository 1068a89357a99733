//! Scan orchestrator
//!
//! Drives the pipeline once per interval:
//! 1. Fetch every `(source, symbol)` pair with bounded concurrency
//! 2. Feed each sample through the window tracker and alert machine
//! 3. Publish transitions as they happen, then the cycle stats

use super::stats::{CycleStats, ScanStats};
use crate::alert::{Alert, AlertStateMachine, AlertTransition};
use crate::broadcast::{BroadcastChannel, ScannerEvent, Subscription, SubscriptionId};
use crate::config::ScannerConfig;
use crate::feed::{now_millis, FetchError, PriceSample, PriceSource, SampleError};
use crate::momentum::{PriceSampleIngestor, SlidingWindowTracker};
use crate::telemetry::{
    increment_counter, record_alert_transition, record_cycle_duration, set_gauge, CounterMetric,
    GaugeMetric,
};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;

/// Cloneable view of a running scanner
///
/// Lets the dashboard server and CLI subscribe and read state while the
/// orchestrator owns the scan loop.
#[derive(Clone)]
pub struct ScannerHandle {
    alerts: Arc<RwLock<AlertStateMachine>>,
    channel: BroadcastChannel,
    stats: Arc<RwLock<ScanStats>>,
}

impl ScannerHandle {
    /// Subscribe to events, starting with a snapshot of active alerts
    ///
    /// Holds the alert lock while registering so no transition can slip
    /// between the snapshot and the first live event.
    pub async fn subscribe(&self) -> Subscription {
        let alerts = self.alerts.read().await;
        self.channel.subscribe(alerts.active_alerts()).await
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id).await
    }

    /// Active alerts, strongest move first
    pub async fn active_alerts(&self) -> Vec<Alert> {
        self.alerts.read().await.active_alerts()
    }

    pub async fn stats(&self) -> ScanStats {
        self.stats.read().await.clone()
    }

    pub fn channel(&self) -> &BroadcastChannel {
        &self.channel
    }
}

/// Fetch one symbol, turning an elapsed timeout into [`FetchError::Timeout`]
async fn fetch_one(
    source: Arc<dyn PriceSource>,
    symbol: String,
    timeout: Duration,
) -> (Arc<dyn PriceSource>, String, Result<PriceSample, FetchError>) {
    let result = match tokio::time::timeout(timeout, source.fetch(&symbol)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            symbol: symbol.clone(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    };
    (source, symbol, result)
}

/// Periodic scanner over a set of price sources
pub struct ScanOrchestrator {
    sources: Vec<Arc<dyn PriceSource>>,
    ingestor: PriceSampleIngestor,
    alerts: Arc<RwLock<AlertStateMachine>>,
    channel: BroadcastChannel,
    stats: Arc<RwLock<ScanStats>>,
    scan_interval: Duration,
    fetch_timeout: Duration,
    fetch_concurrency: usize,
}

impl ScanOrchestrator {
    pub fn new(
        sources: Vec<Arc<dyn PriceSource>>,
        config: &ScannerConfig,
        channel: BroadcastChannel,
    ) -> Self {
        let tracker = SlidingWindowTracker::new(config.window_config());

        Self {
            sources,
            ingestor: PriceSampleIngestor::new(tracker),
            alerts: Arc::new(RwLock::new(AlertStateMachine::new(config.alert_config()))),
            channel,
            stats: Arc::new(RwLock::new(ScanStats::default())),
            scan_interval: config.scan_interval(),
            fetch_timeout: config.fetch_timeout(),
            fetch_concurrency: config.fetch_concurrency.max(1),
        }
    }

    pub fn handle(&self) -> ScannerHandle {
        ScannerHandle {
            alerts: Arc::clone(&self.alerts),
            channel: self.channel.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Total `(source, symbol)` pairs scanned per cycle
    pub fn symbol_count(&self) -> usize {
        self.sources.iter().map(|s| s.symbols().len()).sum()
    }

    pub fn ingestor(&self) -> &PriceSampleIngestor {
        &self.ingestor
    }

    /// Push one sample through the tracker and alert machine
    ///
    /// Any resulting transition is published before this returns.
    pub async fn ingest_sample(
        &mut self,
        sample: &PriceSample,
    ) -> Result<Option<AlertTransition>, SampleError> {
        let stats = self.ingestor.ingest(sample)?;

        let mut alerts = self.alerts.write().await;
        let transition = alerts.evaluate(sample.symbol(), stats.as_ref(), sample.volume());

        if let Some(transition) = &transition {
            record_alert_transition(transition.kind());
            self.stats.write().await.record_transition(transition);
            self.channel
                .publish(ScannerEvent::from(transition.clone()))
                .await;
        }

        Ok(transition)
    }

    /// Run exactly one scan cycle
    pub async fn scan_cycle(&mut self) -> CycleStats {
        let started = Instant::now();

        let jobs: Vec<(Arc<dyn PriceSource>, String)> = self
            .sources
            .iter()
            .flat_map(|source| {
                source
                    .symbols()
                    .iter()
                    .map(move |symbol| (Arc::clone(source), symbol.clone()))
            })
            .collect();
        let total = jobs.len();

        let timeout = self.fetch_timeout;
        let pending: Vec<_> = jobs
            .into_iter()
            .map(|(source, symbol)| fetch_one(source, symbol, timeout))
            .collect();
        let mut fetches = stream::iter(pending).buffer_unordered(self.fetch_concurrency);

        let mut processed = 0;
        let mut failed = 0;

        while let Some((source, symbol, result)) = fetches.next().await {
            let outcome = match result {
                Ok(sample) => self.ingest_sample(&sample).await.map_err(FetchError::from),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(_) => processed += 1,
                Err(e) => {
                    failed += 1;
                    increment_counter(CounterMetric::FetchFailures, 1);
                    tracing::warn!(
                        source = source.name(),
                        symbol = %symbol,
                        error = %e,
                        "Skipping symbol this cycle"
                    );
                }
            }
        }

        let evicted = self.ingestor.tracker_mut().evict_idle(now_millis());
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle symbol histories");
        }

        let active_alerts = self.alerts.read().await.len();
        let elapsed = started.elapsed();
        let cycle = CycleStats {
            total,
            active_alerts,
            scan_duration_ms: elapsed.as_millis() as u64,
            processed,
            failed,
        };

        self.stats.write().await.record_cycle(cycle);
        record_cycle_duration(elapsed);
        set_gauge(GaugeMetric::ActiveAlerts, active_alerts as f64);
        set_gauge(
            GaugeMetric::TrackedSymbols,
            self.ingestor.tracker().symbol_count() as f64,
        );

        self.channel.publish(ScannerEvent::Stats(cycle)).await;

        tracing::info!(
            total,
            processed,
            failed,
            active_alerts,
            duration_ms = cycle.scan_duration_ms,
            "Scan cycle complete"
        );

        cycle
    }

    /// Scan every interval until `shutdown` flips
    ///
    /// A cycle in flight always finishes before the loop exits.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ScanStats {
        let mut interval = tokio::time::interval(self.scan_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            symbols = self.symbol_count(),
            sources = self.sources.len(),
            interval_ms = self.scan_interval.as_millis() as u64,
            "Scanner started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.scan_cycle().await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("Shutdown requested, stopping scanner");
                    break;
                }
            }
        }

        self.stats.read().await.clone()
    }
}
