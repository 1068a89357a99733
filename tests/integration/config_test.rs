//! Configuration loading integration tests

use momentum_scanner::config::{Config, SourceKind};
use momentum_scanner::feed::build_sources;
use momentum_scanner::telemetry::LogFormat;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

fn example_path() -> String {
    format!("{}/config.toml.example", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_example_config_loads_and_validates() {
    let config = assert_ok!(Config::load(example_path()));
    assert_ok!(config.validate());

    assert_eq!(config.scanner.threshold_min, 9.0);
    assert_eq!(config.scanner.threshold_max, 13.0);
    assert_eq!(config.sources.len(), 3);
    assert_eq!(config.sources[0].kind, SourceKind::Binance);
    assert!(config.symbol_count() > 0);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
}

#[test]
fn test_example_config_builds_sources() {
    let config = Config::load(example_path()).unwrap();
    let sources = assert_ok!(build_sources(&config.sources, config.scanner.fetch_timeout()));

    let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["binance", "coingecko", "yahoo"]);
}

#[test]
fn test_load_from_file_with_camel_case_keys() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[scanner]
thresholdMin = 5.0
thresholdMax = 8.0
windowMs = 60000
scanIntervalMs = 2000

[[sources]]
kind = "coingecko"
symbols = ["bitcoin"]
"#
    )
    .unwrap();

    let config = assert_ok!(Config::load(file.path()));
    assert_ok!(config.validate());
    assert_eq!(config.scanner.threshold_min, 5.0);
    assert_eq!(config.scanner.window_ms, 60_000);
    assert_eq!(config.scanner.scan_interval_ms, 2_000);
    assert_eq!(config.sources[0].kind, SourceKind::Coingecko);
}

#[test]
fn test_invalid_band_fails_validation() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[scanner]
threshold_min = 15.0
threshold_max = 10.0
"#
    )
    .unwrap();

    let config = assert_ok!(Config::load(file.path()));
    assert_err!(config.validate());
}

#[test]
fn test_malformed_file_fails_to_load() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[scanner\nthreshold_min = ").unwrap();

    assert_err!(Config::load(file.path()));
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = Config::load(example_path()).unwrap();
    let rendered = toml::to_string_pretty(&config).unwrap();
    let reparsed: Config = toml::from_str(&rendered).unwrap();

    assert_eq!(reparsed.symbol_count(), config.symbol_count());
    assert_eq!(reparsed.server.bind_addr, config.server.bind_addr);
}
