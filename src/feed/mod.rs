//! Price feed module
//!
//! Polls public market-data APIs and turns quotes into validated
//! [`PriceSample`]s. Every provider implements [`PriceSource`] so the
//! scanner runs one loop over all of them.

mod binance;
mod coingecko;
mod http;
mod types;
mod yahoo;

pub use binance::BinanceSource;
pub use coingecko::CoinGeckoSource;
pub use types::{PriceSample, RawSample, SampleError};
pub(crate) use types::validate_price;
pub use yahoo::YahooSource;

use crate::config::{SourceConfig, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a sample for one symbol in one cycle
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch for {symbol} timed out after {timeout_ms}ms")]
    Timeout { symbol: String, timeout_ms: u64 },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status} for {symbol}")]
    Status {
        provider: &'static str,
        symbol: String,
        status: u16,
    },

    #[error("unparseable {provider} response for {symbol}: {reason}")]
    Parse {
        provider: &'static str,
        symbol: String,
        reason: String,
    },

    #[error("invalid sample: {0}")]
    Invalid(#[from] SampleError),
}

/// Trait for anything that can produce a fresh price sample per symbol
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Symbols this source is responsible for
    fn symbols(&self) -> &[String];

    /// Fetch the latest sample for a single symbol
    async fn fetch(&self, symbol: &str) -> Result<PriceSample, FetchError>;
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Build every configured source, sharing one request timeout
pub fn build_sources(
    configs: &[SourceConfig],
    timeout: Duration,
) -> anyhow::Result<Vec<Arc<dyn PriceSource>>> {
    let mut sources: Vec<Arc<dyn PriceSource>> = Vec::with_capacity(configs.len());

    for config in configs {
        if config.symbols.is_empty() {
            tracing::warn!(kind = ?config.kind, "Source has no symbols, skipping");
            continue;
        }

        let base_url = config.base_url.clone();
        let symbols = config.symbols.clone();
        let source: Arc<dyn PriceSource> = match config.kind {
            SourceKind::Binance => {
                let source = BinanceSource::new(symbols, timeout)?;
                Arc::new(match base_url {
                    Some(url) => source.with_base_url(url),
                    None => source,
                })
            }
            SourceKind::Coingecko => {
                let source = CoinGeckoSource::new(symbols, timeout)?;
                Arc::new(match base_url {
                    Some(url) => source.with_base_url(url),
                    None => source,
                })
            }
            SourceKind::Yahoo => {
                let source = YahooSource::new(symbols, timeout)?;
                Arc::new(match base_url {
                    Some(url) => source.with_base_url(url),
                    None => source,
                })
            }
        };

        tracing::info!(
            source = source.name(),
            symbols = source.symbols().len(),
            "Configured price source"
        );
        sources.push(source);
    }

    Ok(sources)
}
