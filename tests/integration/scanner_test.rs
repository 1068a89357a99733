//! Scan pipeline integration tests
//!
//! Drive the orchestrator with in-process sources and check the events a
//! subscriber sees.

use async_trait::async_trait;
use momentum_scanner::broadcast::{BroadcastChannel, ScannerEvent, Subscription};
use momentum_scanner::config::ScannerConfig;
use momentum_scanner::feed::{now_millis, FetchError, PriceSample, PriceSource, SampleError};
use momentum_scanner::scanner::ScanOrchestrator;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

/// Replays a fixed price script per symbol
struct ScriptedSource {
    name: &'static str,
    symbols: Vec<String>,
    script: Mutex<HashMap<String, VecDeque<Option<f64>>>>,
}

impl ScriptedSource {
    /// `None` entries fail that symbol's fetch for one cycle
    fn new(name: &'static str, script: Vec<(&str, Vec<Option<f64>>)>) -> Self {
        Self {
            name,
            symbols: script.iter().map(|(s, _)| s.to_string()).collect(),
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|(s, prices)| (s.to_string(), prices.into_iter().collect()))
                    .collect(),
            ),
        }
    }

    fn prices(name: &'static str, symbol: &str, prices: &[f64]) -> Self {
        Self::new(name, vec![(symbol, prices.iter().copied().map(Some).collect())])
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    fn name(&self) -> &str {
        self.name
    }

    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSample, FetchError> {
        let next = self
            .script
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(|q| q.pop_front())
            .flatten();

        match next {
            Some(price) => Ok(PriceSample::new(symbol, price, now_millis())?.with_volume(10_000.0)?),
            None => Err(FetchError::Status {
                provider: "scripted",
                symbol: symbol.to_string(),
                status: 503,
            }),
        }
    }
}

fn scanner_with(sources: Vec<Arc<dyn PriceSource>>) -> ScanOrchestrator {
    ScanOrchestrator::new(sources, &ScannerConfig::default(), BroadcastChannel::new(64))
}

/// Collect every event queued so far
fn drain(sub: &mut Subscription) -> Vec<ScannerEvent> {
    let mut events = Vec::new();
    while let Some(event) = sub.try_recv() {
        events.push(event);
    }
    events
}

fn alert_change(event: &ScannerEvent) -> f64 {
    match event {
        ScannerEvent::AlertCreated(alert) | ScannerEvent::AlertUpdated(alert) => alert.change_percent,
        other => panic!("expected alert event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_breakout_lifecycle() {
    // Window low 95; 107 -> 12.63%, 107.3 -> 12.95%, 104.5 -> 10%, 108 -> 13.68%
    let source = ScriptedSource::prices(
        "scripted",
        "XYZ",
        &[100.0, 95.0, 98.0, 107.0, 107.3, 104.5, 108.0],
    );
    let mut scanner = scanner_with(vec![Arc::new(source)]);
    let handle = scanner.handle();
    let mut sub = handle.subscribe().await;
    assert_eq!(drain(&mut sub), vec![ScannerEvent::Snapshot(vec![])]);

    for _ in 0..3 {
        scanner.scan_cycle().await;
    }
    let events = drain(&mut sub);
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| matches!(e, ScannerEvent::Stats(_))));

    // Enters the band
    scanner.scan_cycle().await;
    let events = drain(&mut sub);
    match &events[0] {
        ScannerEvent::AlertCreated(alert) => {
            assert_eq!(alert.symbol, "XYZ");
            assert!((alert.change_percent - 12.631578947368421).abs() < 1e-9);
            assert_eq!(alert.min_price, 95.0);
            assert_eq!(alert.max_price, 107.0);
            assert_eq!(alert.volume, Some(10_000.0));
        }
        other => panic!("expected created alert, got {other:?}"),
    }
    assert!(matches!(events[1], ScannerEvent::Stats(_)));

    // Within hysteresis: stats only
    scanner.scan_cycle().await;
    let events = drain(&mut sub);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ScannerEvent::Stats(_)));

    // Falls back to 10%, still in the band: moved more than the hysteresis
    scanner.scan_cycle().await;
    let events = drain(&mut sub);
    match &events[0] {
        ScannerEvent::AlertUpdated(alert) => {
            assert_eq!(alert.symbol, "XYZ");
            assert!((alert.change_percent - 10.0).abs() < 1e-9);
            assert_eq!(alert.current_price, 104.5);
            assert_eq!(alert.min_price, 95.0);
        }
        other => panic!("expected updated alert, got {other:?}"),
    }
    assert!(matches!(events[1], ScannerEvent::Stats(_)));
    assert_eq!(handle.active_alerts().await[0].change_percent, alert_change(&events[0]));

    // Above the band: cleared
    let cycle = scanner.scan_cycle().await;
    assert_eq!(cycle.active_alerts, 0);
    let events = drain(&mut sub);
    match &events[0] {
        ScannerEvent::AlertCleared(cleared) => {
            assert_eq!(cleared.symbol, "XYZ");
            assert!(cleared.change_percent > 13.0);
        }
        other => panic!("expected cleared alert, got {other:?}"),
    }

    let stats = handle.stats().await;
    assert_eq!(stats.cycles, 7);
    assert_eq!(stats.alerts_created, 1);
    assert_eq!(stats.alerts_updated, 1);
    assert_eq!(stats.alerts_cleared, 1);
}

#[tokio::test]
async fn test_failures_stay_per_symbol() {
    let source = ScriptedSource::new(
        "scripted",
        vec![
            ("GOOD", vec![Some(10.0), Some(11.0)]),
            ("FLAKY", vec![None, Some(5.0)]),
        ],
    );
    let mut scanner = scanner_with(vec![Arc::new(source)]);

    let first = scanner.scan_cycle().await;
    assert_eq!(first.total, 2);
    assert_eq!(first.processed, 1);
    assert_eq!(first.failed, 1);

    let second = scanner.scan_cycle().await;
    assert_eq!(second.processed, 2);
    assert_eq!(second.failed, 0);
    // GOOD moved 10%, unaffected by FLAKY's failure
    assert_eq!(second.active_alerts, 1);
}

#[tokio::test]
async fn test_multiple_sources_scanned_each_cycle() {
    let a = ScriptedSource::prices("first", "AAA", &[1.0]);
    let b = ScriptedSource::prices("second", "BBB", &[2.0]);
    let mut scanner = scanner_with(vec![Arc::new(a), Arc::new(b)]);

    assert_eq!(scanner.symbol_count(), 2);
    let cycle = scanner.scan_cycle().await;
    assert_eq!(cycle.total, 2);
    assert_eq!(cycle.processed, 2);
    assert_eq!(scanner.ingestor().tracker().symbol_count(), 2);
}

#[tokio::test]
async fn test_identical_sample_not_double_counted() {
    let mut scanner = scanner_with(vec![]);
    let ts = now_millis();
    let sample = PriceSample::new("DUP", 50.0, ts).unwrap();

    assert_ok!(scanner.ingest_sample(&sample).await);
    assert_ok!(scanner.ingest_sample(&sample).await);
    assert_eq!(scanner.ingestor().tracker().sample_count("DUP"), 1);
}

#[tokio::test]
async fn test_out_of_order_sample_rejected() {
    let mut scanner = scanner_with(vec![]);
    let ts = now_millis();

    assert_ok!(scanner.ingest_sample(&PriceSample::new("OOO", 10.0, ts).unwrap()).await);
    let err = assert_err!(
        scanner
            .ingest_sample(&PriceSample::new("OOO", 11.0, ts - 1_000).unwrap())
            .await
    );
    assert!(matches!(err, SampleError::OutOfOrder { .. }));
    assert_eq!(scanner.ingestor().tracker().sample_count("OOO"), 1);
}

#[tokio::test]
async fn test_late_subscriber_gets_active_snapshot() {
    let mut scanner = scanner_with(vec![]);
    let handle = scanner.handle();
    let ts = now_millis();

    for (i, price) in [20.0, 22.0].into_iter().enumerate() {
        let sample = PriceSample::new("SNAP", price, ts + i as i64).unwrap();
        scanner.ingest_sample(&sample).await.unwrap();
    }

    let mut sub = handle.subscribe().await;
    match sub.recv().await {
        Some(ScannerEvent::Snapshot(alerts)) => {
            assert_eq!(alerts, handle.active_alerts().await);
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].symbol, "SNAP");
        }
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_loop_respects_shutdown() {
    let config = ScannerConfig {
        scan_interval_ms: 5,
        ..Default::default()
    };
    let source = ScriptedSource::prices("scripted", "LOOP", &[1.0, 1.0, 1.0, 1.0]);
    let scanner = ScanOrchestrator::new(vec![Arc::new(source)], &config, BroadcastChannel::default());
    let handle = scanner.handle();
    let (tx, rx) = tokio::sync::watch::channel(false);

    let task = tokio::spawn(scanner.run(rx));
    tokio::time::sleep(Duration::from_millis(40)).await;
    tx.send(true).unwrap();

    let final_stats = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scanner did not stop")
        .unwrap();
    assert!(final_stats.cycles >= 1);
    assert_eq!(final_stats, handle.stats().await);
}
