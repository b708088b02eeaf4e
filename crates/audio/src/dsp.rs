use std::f32::consts::PI;

use pulse_domain::{AnalysisError, DomainError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakLevel {
    pub max: f32,
    pub min: f32,
}

impl PeakLevel {
    /// `|min| + |max|`, the span detection thresholds are scaled against.
    pub fn amplitude(&self) -> f32 {
        self.min.abs() + self.max.abs()
    }
}

/// Minimum and maximum amplitude of `samples` in a single pass.
pub fn range_of(samples: &[f32]) -> Result<PeakLevel, AnalysisError> {
    let (first, rest) = samples.split_first().ok_or(AnalysisError::EmptyBuffer)?;
    let mut peak = PeakLevel {
        max: *first,
        min: *first,
    };
    for sample in rest {
        peak.max = peak.max.max(*sample);
        peak.min = peak.min.min(*sample);
    }
    Ok(peak)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub enabled: bool,
    pub cutoff_hz: f32,
    /// Resonance at the cutoff, in decibels.
    pub resonance_db: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cutoff_hz: 350.0,
            resonance_db: 1.0,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self, sample_rate: u32) -> Result<(), DomainError> {
        let nyquist = sample_rate as f32 / 2.0;
        if !(self.cutoff_hz > 0.0 && self.cutoff_hz < nyquist) {
            return Err(DomainError::validation(format!(
                "cutoff {} Hz must lie between 0 and {} Hz",
                self.cutoff_hz, nyquist
            )));
        }
        if !self.resonance_db.is_finite() {
            return Err(DomainError::validation("resonance must be finite"));
        }
        Ok(())
    }
}

/// Second order low-pass section (RBJ cookbook coefficients, direct form I).
#[derive(Clone, Debug)]
pub struct LowPassFilter {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowPassFilter {
    pub fn new(config: &FilterConfig, sample_rate: u32) -> Result<Self, DomainError> {
        config.validate(sample_rate)?;
        let w0 = 2.0 * PI * config.cutoff_hz / sample_rate as f32;
        let q = 10f32.powf(config.resonance_db / 20.0);
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();
        let a0 = 1.0 + alpha;
        Ok(Self {
            b0: (1.0 - cos_w0) / 2.0 / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: (1.0 - cos_w0) / 2.0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        })
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }

    pub fn apply(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn range_tracks_extremes() {
        let peak = range_of(&[0.5, -1.0, 0.75]).unwrap();
        assert_relative_eq!(peak.max, 0.75);
        assert_relative_eq!(peak.min, -1.0);
        assert_relative_eq!(peak.amplitude(), 1.75);
    }

    #[test]
    fn range_starts_from_first_sample() {
        let peak = range_of(&[0.2, 0.4]).unwrap();
        assert_relative_eq!(peak.min, 0.2);
        assert_eq!(range_of(&[]), Err(AnalysisError::EmptyBuffer));
    }

    #[test]
    fn low_pass_keeps_dc() {
        let mut filter = LowPassFilter::new(&FilterConfig::default(), 44_100).unwrap();
        let mut buffer = vec![1.0; 44_100];
        filter.apply(&mut buffer);
        assert_relative_eq!(buffer[buffer.len() - 1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn low_pass_rejects_nyquist() {
        let mut filter = LowPassFilter::new(&FilterConfig::default(), 44_100).unwrap();
        let mut buffer: Vec<f32> = (0..4_410)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        filter.apply(&mut buffer);
        let tail = range_of(&buffer[2_205..]).unwrap();
        assert!(tail.amplitude() < 1e-3);
    }

    #[test]
    fn filter_config_rejects_cutoff_above_nyquist() {
        let config = FilterConfig {
            cutoff_hz: 30_000.0,
            ..Default::default()
        };
        assert!(LowPassFilter::new(&config, 44_100).is_err());
    }
}
