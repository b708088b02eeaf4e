//! Tunables for every analysis stage.
//!
//! Defaults reproduce the reference heuristics; a config file only needs to
//! name the fields it overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pulse_audio::FilterConfig;
use pulse_domain::DomainError;
use serde::{Deserialize, Serialize};

/// Shortest gap between two beats, 260 BPM.
pub const MIN_BEAT_INTERVAL_MS: u64 = 230;
/// Loudest detection pass, as a fraction of the amplitude above the minimum.
pub const MAX_THRESHOLD_RATIO: f32 = 0.9;
/// Quietest detection pass.
pub const MIN_THRESHOLD_RATIO: f32 = 0.3;
/// Threshold decrement between passes, on the nominal [-1, 1] amplitude scale.
pub const THRESHOLD_STEP: f32 = 0.05;
/// Width of the interval bands candidate periods compete in.
pub const BUCKET_WIDTH_MS: u64 = 500;
/// How many of the lowest candidate bands are considered as the fundamental.
pub const REFERENCE_CANDIDATES: usize = 3;
/// Allowed drift between two chained anchors.
pub const CHAIN_TOLERANCE_MS: u64 = 2;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PeakOptions {
    pub convert_to_milliseconds: bool,
    pub remove_duplicates: bool,
}

impl Default for PeakOptions {
    fn default() -> Self {
        Self {
            convert_to_milliseconds: true,
            remove_duplicates: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorTuning {
    pub max_threshold_ratio: f32,
    pub min_threshold_ratio: f32,
    pub threshold_step: f32,
    pub min_interval_ms: u64,
}

impl Default for DetectorTuning {
    fn default() -> Self {
        Self {
            max_threshold_ratio: MAX_THRESHOLD_RATIO,
            min_threshold_ratio: MIN_THRESHOLD_RATIO,
            threshold_step: THRESHOLD_STEP,
            min_interval_ms: MIN_BEAT_INTERVAL_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TempoTuning {
    pub min_interval_ms: u64,
    pub bucket_width_ms: u64,
    pub reference_candidates: usize,
}

impl DetectorTuning {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.min_threshold_ratio)
            || !(0.0..=1.0).contains(&self.max_threshold_ratio)
        {
            return Err(DomainError::validation(
                "threshold ratios must lie within 0 and 1",
            ));
        }
        if self.min_threshold_ratio > self.max_threshold_ratio {
            return Err(DomainError::validation(
                "min threshold ratio cannot exceed max threshold ratio",
            ));
        }
        // a non-positive step never lowers the threshold
        if !(self.threshold_step > 0.0) {
            return Err(DomainError::validation("threshold step must be positive"));
        }
        if self.min_interval_ms == 0 {
            return Err(DomainError::validation(
                "minimum beat interval must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for TempoTuning {
    fn default() -> Self {
        Self {
            min_interval_ms: MIN_BEAT_INTERVAL_MS,
            bucket_width_ms: BUCKET_WIDTH_MS,
            reference_candidates: REFERENCE_CANDIDATES,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GridTuning {
    pub min_anchor_spacing_ms: u64,
    pub chain_tolerance_ms: u64,
}

impl TempoTuning {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.min_interval_ms == 0 {
            return Err(DomainError::validation(
                "minimum beat interval must be positive",
            ));
        }
        if self.bucket_width_ms == 0 {
            return Err(DomainError::validation("bucket width must be positive"));
        }
        if self.reference_candidates == 0 {
            return Err(DomainError::validation(
                "at least one reference candidate is required",
            ));
        }
        Ok(())
    }
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            min_anchor_spacing_ms: MIN_BEAT_INTERVAL_MS,
            chain_tolerance_ms: CHAIN_TOLERANCE_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub peaks: PeakOptions,
    pub detector: DetectorTuning,
    pub tempo: TempoTuning,
    pub grid: GridTuning,
    pub filter: FilterConfig,
}

impl AnalysisConfig {
    /// Reads a YAML or JSON (by `.json` extension) config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("read config file {:?}", path))?;
        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("parse json config {:?}", path))?,
            _ => serde_yaml::from_str(&text)
                .with_context(|| format!("parse yaml config {:?}", path))?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.detector.validate()?;
        self.tempo.validate()
    }
}
