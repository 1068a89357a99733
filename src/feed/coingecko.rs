//! CoinGecko simple-price source

use super::http::{build_client, get_body, parse_error};
use super::{now_millis, FetchError, PriceSample, PriceSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const COINGECKO_API_URL: &str = "https://api.coingecko.com";

const PROVIDER: &str = "coingecko";

/// One coin entry in a `/simple/price` response
#[derive(Debug, Deserialize)]
struct CoinGeckoQuote {
    usd: Option<f64>,
    usd_24h_vol: Option<f64>,
}

/// Polls `/api/v3/simple/price` keyed by CoinGecko coin id (e.g. "bitcoin")
pub struct CoinGeckoSource {
    client: Client,
    base_url: String,
    symbols: Vec<String>,
}

impl CoinGeckoSource {
    pub fn new(symbols: Vec<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: COINGECKO_API_URL.to_string(),
            symbols: symbols.into_iter().map(|s| s.to_lowercase()).collect(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn price_url(&self) -> String {
        format!("{}/api/v3/simple/price", self.base_url)
    }

    fn parse_quote(body: &str, coin_id: &str, received_at: i64) -> Result<PriceSample, FetchError> {
        let mut quotes: HashMap<String, CoinGeckoQuote> =
            serde_json::from_str(body).map_err(|e| parse_error(PROVIDER, coin_id, e))?;

        let quote = quotes
            .remove(coin_id)
            .ok_or_else(|| parse_error(PROVIDER, coin_id, "coin missing from response"))?;
        let price = quote
            .usd
            .ok_or_else(|| parse_error(PROVIDER, coin_id, "missing usd price"))?;

        let sample = PriceSample::new(coin_id, price, received_at)?;
        Ok(match quote.usd_24h_vol {
            Some(volume) => sample.with_volume(volume)?,
            None => sample,
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSample, FetchError> {
        let url = self.price_url();
        let query = [
            ("ids", symbol),
            ("vs_currencies", "usd"),
            ("include_24hr_vol", "true"),
        ];
        let body = get_body(&self.client, &url, &query, PROVIDER, symbol).await?;
        Self::parse_quote(&body, symbol, now_millis())
    }
}
