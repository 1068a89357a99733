//! Binance REST ticker source

use super::http::{build_client, get_body, parse_error};
use super::{now_millis, FetchError, PriceSample, PriceSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Binance REST base URL
const BINANCE_API_URL: &str = "https://api.binance.com";

const PROVIDER: &str = "binance";

/// Binance 24h ticker response (subset)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceTicker {
    symbol: String,
    /// Last traded price, sent as a string
    last_price: String,
    /// Base asset volume over 24h, sent as a string
    volume: String,
}

/// Polls `/api/v3/ticker/24hr` once per symbol per cycle
pub struct BinanceSource {
    client: Client,
    base_url: String,
    symbols: Vec<String>,
}

impl BinanceSource {
    /// Create a source for the given symbols (e.g. "BTCUSDT")
    pub fn new(symbols: Vec<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: BINANCE_API_URL.to_string(),
            symbols: symbols.into_iter().map(|s| s.to_uppercase()).collect(),
        })
    }

    /// Point the source at a different host (testnets, mirrors)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn ticker_url(&self) -> String {
        format!("{}/api/v3/ticker/24hr", self.base_url)
    }

    /// Parse a ticker body into a sample stamped with the local receive time
    fn parse_ticker(body: &str, symbol: &str, received_at: i64) -> Result<PriceSample, FetchError> {
        let ticker: BinanceTicker =
            serde_json::from_str(body).map_err(|e| parse_error(PROVIDER, symbol, e))?;

        let price: f64 = ticker
            .last_price
            .parse()
            .map_err(|e| parse_error(PROVIDER, symbol, format!("lastPrice: {e}")))?;
        let volume: f64 = ticker
            .volume
            .parse()
            .map_err(|e| parse_error(PROVIDER, symbol, format!("volume: {e}")))?;

        Ok(PriceSample::new(ticker.symbol, price, received_at)?.with_volume(volume)?)
    }
}

#[async_trait]
impl PriceSource for BinanceSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSample, FetchError> {
        let url = self.ticker_url();
        let body = get_body(&self.client, &url, &[("symbol", symbol)], PROVIDER, symbol).await?;
        Self::parse_ticker(&body, symbol, now_millis())
    }
}
