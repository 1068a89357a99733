//! Dashboard WebSocket integration tests

use futures_util::StreamExt;
use momentum_scanner::broadcast::{BroadcastChannel, DashboardServer};
use momentum_scanner::config::ScannerConfig;
use momentum_scanner::feed::{now_millis, PriceSample};
use momentum_scanner::scanner::{ScanOrchestrator, ScannerHandle};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(handle: ScannerHandle) -> (SocketAddr, watch::Sender<bool>) {
    let server = DashboardServer::bind("127.0.0.1:0", handle).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (tx, rx) = watch::channel(false);
    tokio::spawn(server.run(rx));
    (addr, tx)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    client
}

/// Next JSON text frame, failing the test after a few seconds
async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn wait_for_subscribers(handle: &ScannerHandle, expected: usize) {
    for _ in 0..100 {
        if handle.channel().subscriber_count().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} subscribers");
}

#[tokio::test]
async fn test_client_receives_snapshot_then_alerts() {
    let mut scanner = ScanOrchestrator::new(vec![], &ScannerConfig::default(), BroadcastChannel::new(16));
    let handle = scanner.handle();
    let (addr, _shutdown) = start_server(handle.clone()).await;

    let mut client = connect(addr).await;
    let snapshot = next_json(&mut client).await;
    assert_eq!(snapshot["type"], "snapshot");
    assert_eq!(snapshot["data"], Value::Array(vec![]));

    let ts = now_millis();
    scanner
        .ingest_sample(&PriceSample::new("TSLA", 200.0, ts).unwrap())
        .await
        .unwrap();
    scanner
        .ingest_sample(&PriceSample::new("TSLA", 220.0, ts + 1_000).unwrap())
        .await
        .unwrap();

    let created = next_json(&mut client).await;
    assert_eq!(created["type"], "alert");
    assert_eq!(created["action"], "created");
    assert_eq!(created["data"]["symbol"], "TSLA");
    let change = created["data"]["changePercent"].as_f64().unwrap();
    assert!((change - 10.0).abs() < 1e-9);
    assert_eq!(created["data"]["firstDetectedAt"], ts + 1_000);

    // 15% is above the band
    scanner
        .ingest_sample(&PriceSample::new("TSLA", 230.0, ts + 2_000).unwrap())
        .await
        .unwrap();
    let cleared = next_json(&mut client).await;
    assert_eq!(cleared["type"], "cleared");
    assert_eq!(cleared["data"]["symbol"], "TSLA");
    assert_eq!(cleared["data"]["clearedAt"], ts + 2_000);
}

#[tokio::test]
async fn test_stats_event_reaches_client() {
    let mut scanner = ScanOrchestrator::new(vec![], &ScannerConfig::default(), BroadcastChannel::new(16));
    let (addr, _shutdown) = start_server(scanner.handle()).await;

    let mut client = connect(addr).await;
    next_json(&mut client).await;

    scanner.scan_cycle().await;
    let stats = next_json(&mut client).await;
    assert_eq!(stats["type"], "stats");
    assert_eq!(stats["data"]["total"], 0);
    assert_eq!(stats["data"]["activeAlerts"], 0);
    assert!(stats["data"]["scanDurationMs"].is_u64());
}

#[tokio::test]
async fn test_late_client_snapshot_matches_active_set() {
    let mut scanner = ScanOrchestrator::new(vec![], &ScannerConfig::default(), BroadcastChannel::new(16));
    let handle = scanner.handle();
    let (addr, _shutdown) = start_server(handle.clone()).await;

    let ts = now_millis();
    for (symbol, low, high) in [("AAA", 10.0, 11.0), ("BBB", 100.0, 112.0)] {
        scanner
            .ingest_sample(&PriceSample::new(symbol, low, ts).unwrap())
            .await
            .unwrap();
        scanner
            .ingest_sample(&PriceSample::new(symbol, high, ts + 1).unwrap())
            .await
            .unwrap();
    }

    let mut client = connect(addr).await;
    let snapshot = next_json(&mut client).await;
    assert_eq!(snapshot["type"], "snapshot");

    let expected = serde_json::to_value(handle.active_alerts().await).unwrap();
    assert_eq!(snapshot["data"], expected);
    // Strongest move first
    assert_eq!(snapshot["data"][0]["symbol"], "BBB");
    assert_eq!(snapshot["data"][1]["symbol"], "AAA");
}

#[tokio::test]
async fn test_disconnect_unsubscribes() {
    let scanner = ScanOrchestrator::new(vec![], &ScannerConfig::default(), BroadcastChannel::new(16));
    let handle = scanner.handle();
    let (addr, _shutdown) = start_server(handle.clone()).await;

    let mut client = connect(addr).await;
    next_json(&mut client).await;
    wait_for_subscribers(&handle, 1).await;

    client.close(None).await.unwrap();
    wait_for_subscribers(&handle, 0).await;
}

#[tokio::test]
async fn test_server_stops_accepting_after_shutdown() {
    let scanner = ScanOrchestrator::new(vec![], &ScannerConfig::default(), BroadcastChannel::new(16));
    let server = DashboardServer::bind("127.0.0.1:0", scanner.handle()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(server.run(rx));

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("server did not stop")
        .unwrap();

    assert!(connect_async(format!("ws://{addr}")).await.is_err());
}
