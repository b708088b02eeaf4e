//! Tempo and beat grid estimation over a mono, low-pass filtered sample buffer.
//!
//! The free functions run each stage with default tuning:
//! [`detect_significant_peaks`] feeds [`estimate_beat`], whose result drives
//! [`extrapolate_beat_grid`]. [`AnalysisPipeline`] chains them with decoding and
//! filtering for whole files.

pub mod config;
pub mod grid;
pub mod observer;
pub mod peaks;
pub mod pipeline;
pub mod tempo;

use pulse_domain::{AnalysisError, BeatEstimate, BeatGrid, PeakSet, SampleBuffer};

pub use config::{AnalysisConfig, DetectorTuning, GridTuning, PeakOptions, TempoTuning};
pub use grid::GridExtrapolator;
pub use observer::{AnalysisStatus, NullObserver, StatusObserver, TracingObserver};
pub use peaks::{normalize, PeakDetector};
pub use pipeline::AnalysisPipeline;
pub use tempo::{Candidate, IntervalHistogram, TempoEstimator};

pub fn detect_significant_peaks(
    buffer: &SampleBuffer,
    options: &PeakOptions,
) -> Result<PeakSet, AnalysisError> {
    let raw = PeakDetector::default().detect(buffer)?;
    Ok(normalize(raw, buffer.sample_rate(), options))
}

pub fn estimate_beat(peaks: &PeakSet) -> Result<BeatEstimate, AnalysisError> {
    TempoEstimator::default().estimate(peaks)
}

pub fn extrapolate_beat_grid(
    duration_ms: u64,
    peaks: &PeakSet,
    beat: &BeatEstimate,
) -> Result<BeatGrid, AnalysisError> {
    GridExtrapolator::default().extrapolate(duration_ms, peaks, beat)
}
