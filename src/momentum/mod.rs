//! Momentum detection module
//!
//! Tracks a trailing price window per symbol and reports how far the
//! latest price sits above the window low. The alert layer decides what
//! counts as a breakout.

mod ingest;
mod window;

pub use ingest::PriceSampleIngestor;
pub use window::{
    SlidingWindowTracker, WindowConfig, WindowStats, DEFAULT_MIN_SAMPLES, DEFAULT_WINDOW_MS,
};
