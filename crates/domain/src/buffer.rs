use serde::{Deserialize, Serialize};
use time::Duration;

use crate::DomainError;

/// Mono, already low-pass filtered amplitudes together with their timing metadata.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    /// Seconds.
    duration: f64,
    samples: Vec<f32>,
}

impl SampleBuffer {
    pub fn new(sample_rate: u32, duration: f64, samples: Vec<f32>) -> Result<Self, DomainError> {
        if sample_rate == 0 {
            return Err(DomainError::validation("sample rate must be positive"));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(DomainError::validation("duration must be a positive number"));
        }
        Ok(Self {
            sample_rate,
            duration,
            samples,
        })
    }

    /// Builds a buffer whose duration is derived from the sample count.
    pub fn from_samples(sample_rate: u32, samples: Vec<f32>) -> Result<Self, DomainError> {
        if sample_rate == 0 {
            return Err(DomainError::validation("sample rate must be positive"));
        }
        let duration = samples.len() as f64 / sample_rate as f64;
        Self::new(sample_rate, duration, samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds_f64(self.duration)
    }

    pub fn duration_ms(&self) -> u64 {
        (self.duration * 1000.0).round() as u64
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
