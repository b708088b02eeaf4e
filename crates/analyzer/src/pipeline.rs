use std::path::Path;

use anyhow::Result;
use pulse_audio::AudioDecoder;
use pulse_domain::{AnalysisError, AnalysisReport, DomainError, SampleBuffer};
use tracing::{info, instrument};

use crate::config::{AnalysisConfig, PeakOptions};
use crate::grid::GridExtrapolator;
use crate::observer::{AnalysisStatus, StatusObserver, TracingObserver};
use crate::peaks::{normalize, PeakDetector};
use crate::tempo::TempoEstimator;

/// Decode, filter, then run peaks, tempo and grid over one track. Each call is
/// independent; the pipeline holds configuration only.
pub struct AnalysisPipeline<O = TracingObserver> {
    config: AnalysisConfig,
    detector: PeakDetector,
    estimator: TempoEstimator,
    extrapolator: GridExtrapolator,
    observer: O,
}

impl AnalysisPipeline<TracingObserver> {
    pub fn new(config: AnalysisConfig) -> Result<Self, DomainError> {
        Self::with_observer(config, TracingObserver)
    }
}

impl Default for AnalysisPipeline<TracingObserver> {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            detector: PeakDetector::default(),
            estimator: TempoEstimator::default(),
            extrapolator: GridExtrapolator::default(),
            observer: TracingObserver,
        }
    }
}

impl<O: StatusObserver> AnalysisPipeline<O> {
    /// Fails when the tuning would not let every stage terminate with a result.
    pub fn with_observer(config: AnalysisConfig, observer: O) -> Result<Self, DomainError> {
        Ok(Self {
            detector: PeakDetector::new(config.detector)?,
            estimator: TempoEstimator::new(config.tempo)?,
            extrapolator: GridExtrapolator::new(config.grid),
            config,
            observer,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[instrument(skip(self, buffer), fields(sample_rate = buffer.sample_rate(), samples = buffer.len()))]
    pub fn analyze_buffer(&self, buffer: &SampleBuffer) -> Result<AnalysisReport, AnalysisError> {
        self.observer.on_status(AnalysisStatus::DetectingPeaks);
        let raw = self.detector.detect(buffer)?;
        // tempo and grid always work on deduplicated millisecond offsets
        let timing_options = PeakOptions::default();
        let (peaks, timing_peaks) = if self.config.peaks == timing_options {
            let peaks = normalize(raw, buffer.sample_rate(), &timing_options);
            (peaks.clone(), peaks)
        } else {
            (
                normalize(raw.clone(), buffer.sample_rate(), &self.config.peaks),
                normalize(raw, buffer.sample_rate(), &timing_options),
            )
        };

        self.observer.on_status(AnalysisStatus::EstimatingTempo);
        let beat = self.estimator.estimate(&timing_peaks)?;

        self.observer.on_status(AnalysisStatus::ExtrapolatingGrid);
        let duration_ms = buffer.duration_ms();
        let grid = self
            .extrapolator
            .extrapolate(duration_ms, &timing_peaks, &beat)?;

        self.observer.on_status(AnalysisStatus::Complete);
        info!(
            bpm = beat.bpm(),
            period_ms = beat.period_ms(),
            peaks = timing_peaks.len(),
            grid = grid.len(),
            "analysis complete"
        );
        Ok(AnalysisReport::new(
            buffer.sample_rate(),
            duration_ms,
            peaks,
            beat,
            grid,
        ))
    }

    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisReport> {
        self.observer.on_status(AnalysisStatus::Decoding);
        let mut audio = AudioDecoder::open(path.as_ref())?;
        if self.config.filter.enabled {
            self.observer.on_status(AnalysisStatus::Filtering);
            audio.low_pass(&self.config.filter)?;
        }
        let buffer = audio.into_sample_buffer()?;
        Ok(self.analyze_buffer(&buffer)?)
    }
}
