//! Sample ingestion
//!
//! Single entry point for price samples from any source. Validates the
//! record and hands it to the window tracker.

use super::window::{SlidingWindowTracker, WindowStats};
use crate::feed::{PriceSample, RawSample, SampleError};

/// Feeds validated samples into a [`SlidingWindowTracker`]
pub struct PriceSampleIngestor {
    tracker: SlidingWindowTracker,
    accepted: u64,
    rejected: u64,
}

impl PriceSampleIngestor {
    pub fn new(tracker: SlidingWindowTracker) -> Self {
        Self {
            tracker,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Ingest a validated sample
    ///
    /// `Ok(None)` means the sample was kept but the window is not warm yet.
    pub fn ingest(&mut self, sample: &PriceSample) -> Result<Option<WindowStats>, SampleError> {
        let result = self
            .tracker
            .record(sample.symbol(), sample.price(), sample.timestamp());

        match &result {
            Ok(_) => self.accepted += 1,
            Err(e) => {
                self.rejected += 1;
                tracing::debug!(symbol = sample.symbol(), error = %e, "Sample rejected");
            }
        }

        result
    }

    /// Validate and ingest an unchecked record
    pub fn ingest_raw(&mut self, raw: RawSample) -> Result<Option<WindowStats>, SampleError> {
        match PriceSample::try_from(raw) {
            Ok(sample) => self.ingest(&sample),
            Err(e) => {
                self.rejected += 1;
                tracing::debug!(error = %e, "Raw sample rejected");
                Err(e)
            }
        }
    }

    /// Samples that reached the tracker
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Samples refused by validation or ordering
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn tracker(&self) -> &SlidingWindowTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SlidingWindowTracker {
        &mut self.tracker
    }
}
