//! Yahoo Finance quote source for equities and ETFs

use super::http::{build_client, get_body, parse_error};
use super::{now_millis, FetchError, PriceSample, PriceSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

const PROVIDER: &str = "yahoo";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooEnvelope {
    quote_response: YahooQuoteResponse,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(default)]
    result: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuote {
    symbol: String,
    regular_market_price: Option<f64>,
    regular_market_volume: Option<f64>,
}

/// Polls `/v7/finance/quote` for one ticker at a time
pub struct YahooSource {
    client: Client,
    base_url: String,
    symbols: Vec<String>,
}

impl YahooSource {
    pub fn new(symbols: Vec<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: YAHOO_API_URL.to_string(),
            symbols: symbols.into_iter().map(|s| s.to_uppercase()).collect(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn quote_url(&self) -> String {
        format!("{}/v7/finance/quote", self.base_url)
    }

    fn parse_quote(body: &str, symbol: &str, received_at: i64) -> Result<PriceSample, FetchError> {
        let envelope: YahooEnvelope =
            serde_json::from_str(body).map_err(|e| parse_error(PROVIDER, symbol, e))?;

        let quote = envelope
            .quote_response
            .result
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| parse_error(PROVIDER, symbol, "symbol missing from response"))?;
        let price = quote
            .regular_market_price
            .ok_or_else(|| parse_error(PROVIDER, symbol, "missing regularMarketPrice"))?;

        let sample = PriceSample::new(quote.symbol, price, received_at)?;
        Ok(match quote.regular_market_volume {
            Some(volume) => sample.with_volume(volume)?,
            None => sample,
        })
    }
}

#[async_trait]
impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSample, FetchError> {
        let url = self.quote_url();
        let body = get_body(&self.client, &url, &[("symbols", symbol)], PROVIDER, symbol).await?;
        Self::parse_quote(&body, symbol, now_millis())
    }
}
