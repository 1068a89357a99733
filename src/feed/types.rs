//! Price feed types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a price sample is refused before it reaches a window
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("empty symbol")]
    EmptySymbol,

    #[error("invalid price for {symbol}: {price}")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("invalid timestamp for {symbol}: {timestamp}")]
    InvalidTimestamp { symbol: String, timestamp: i64 },

    #[error("invalid volume for {symbol}: {volume}")]
    InvalidVolume { symbol: String, volume: f64 },

    #[error("out-of-order sample for {symbol}: {timestamp} is older than {latest}")]
    OutOfOrder {
        symbol: String,
        timestamp: i64,
        latest: i64,
    },
}

/// Raw price record as delivered by a fetcher or over the wire
///
/// Converting into [`PriceSample`] applies validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    pub symbol: String,
    pub price: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// A single validated price observation
///
/// Fields are private so a sample cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSample", into = "RawSample")]
pub struct PriceSample {
    symbol: String,
    price: f64,
    timestamp: i64,
    volume: Option<f64>,
}

impl PriceSample {
    /// Create a sample, rejecting non-positive prices and timestamps
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: i64) -> Result<Self, SampleError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(SampleError::EmptySymbol);
        }
        validate_price(&symbol, price)?;
        if timestamp <= 0 {
            return Err(SampleError::InvalidTimestamp { symbol, timestamp });
        }

        Ok(Self {
            symbol,
            price,
            timestamp,
            volume: None,
        })
    }

    /// Attach a traded volume to the sample
    pub fn with_volume(mut self, volume: f64) -> Result<Self, SampleError> {
        if !volume.is_finite() || volume < 0.0 {
            return Err(SampleError::InvalidVolume {
                symbol: self.symbol,
                volume,
            });
        }
        self.volume = Some(volume);
        Ok(self)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Sample time in epoch milliseconds
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn volume(&self) -> Option<f64> {
        self.volume
    }
}

/// Shared price check used by both sample construction and the window tracker
pub(crate) fn validate_price(symbol: &str, price: f64) -> Result<(), SampleError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(SampleError::InvalidPrice {
            symbol: symbol.to_string(),
            price,
        });
    }
    Ok(())
}

impl TryFrom<RawSample> for PriceSample {
    type Error = SampleError;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        let sample = PriceSample::new(raw.symbol, raw.price, raw.timestamp)?;
        match raw.volume {
            Some(volume) => sample.with_volume(volume),
            None => Ok(sample),
        }
    }
}

impl From<PriceSample> for RawSample {
    fn from(sample: PriceSample) -> Self {
        Self {
            symbol: sample.symbol,
            price: sample.price,
            timestamp: sample.timestamp,
            volume: sample.volume,
        }
    }
}
