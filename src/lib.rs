//! momentum-scanner: real-time breakout scanner over public market data
//!
//! This library provides the core components for:
//! - Polling price feeds from Binance, CoinGecko and Yahoo Finance
//! - Per-symbol sliding-window change tracking
//! - Alert state with threshold band and hysteresis
//! - Event fan-out to dashboard clients over WebSocket
//! - Periodic scan orchestration with bounded concurrency
//! - Structured logging and Prometheus metrics

pub mod alert;
pub mod broadcast;
pub mod cli;
pub mod config;
pub mod feed;
pub mod momentum;
pub mod scanner;
pub mod telemetry;
