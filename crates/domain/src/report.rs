use serde::{Deserialize, Serialize};

use crate::{beat::BeatEstimate, beat::BeatGrid, peaks::PeakSet};

/// Everything one analysis pass produced for a single buffer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub sample_rate: u32,
    pub duration_ms: u64,
    pub peaks: PeakSet,
    pub beat: BeatEstimate,
    pub grid: BeatGrid,
}

impl AnalysisReport {
    pub fn new(
        sample_rate: u32,
        duration_ms: u64,
        peaks: PeakSet,
        beat: BeatEstimate,
        grid: BeatGrid,
    ) -> Self {
        Self {
            sample_rate,
            duration_ms,
            peaks,
            beat,
            grid,
        }
    }
}
