use pulse_audio::range_of;
use pulse_domain::{AnalysisError, DomainError, PeakSet, PeakUnit, SampleBuffer};
use tracing::debug;

use crate::config::{DetectorTuning, PeakOptions};

/// Collects loud transients with a descending series of amplitude thresholds.
#[derive(Clone, Debug, Default)]
pub struct PeakDetector {
    tuning: DetectorTuning,
}

impl PeakDetector {
    pub fn new(tuning: DetectorTuning) -> Result<Self, DomainError> {
        tuning.validate()?;
        Ok(Self { tuning })
    }

    /// Sample indices of significant peaks, ascending. Indices found by more than
    /// one threshold pass appear more than once.
    pub fn detect(&self, buffer: &SampleBuffer) -> Result<Vec<u64>, AnalysisError> {
        let samples = buffer.samples();
        let limit = range_of(samples)?;
        if buffer.duration_secs() * 1000.0 < self.tuning.min_interval_ms as f64 {
            debug!(
                duration_secs = buffer.duration_secs(),
                "buffer shorter than one beat interval"
            );
            return Ok(Vec::new());
        }

        let amplitude = limit.amplitude();
        let max_threshold = limit.min + amplitude * self.tuning.max_threshold_ratio;
        let min_threshold = limit.min + amplitude * self.tuning.min_threshold_ratio;
        let separation =
            (buffer.sample_rate() as u64 * self.tuning.min_interval_ms / 1000) as usize;
        // loose cap against runaway collection on noisy material
        let peak_cap = buffer.duration_secs().floor() as usize;

        let mut peaks = Vec::new();
        let mut threshold = max_threshold;
        let mut passes = 0usize;
        while threshold >= min_threshold && peaks.len() <= peak_cap {
            scan_above(samples, threshold, separation, &mut peaks);
            threshold -= self.tuning.threshold_step;
            passes += 1;
        }
        peaks.sort_unstable();

        debug!(
            passes,
            peaks = peaks.len(),
            min = limit.min,
            max = limit.max,
            "detected significant peaks"
        );
        Ok(peaks)
    }
}

/// Records every sample above `threshold`, then skips `separation` samples.
fn scan_above(samples: &[f32], threshold: f32, separation: usize, peaks: &mut Vec<u64>) {
    let mut index = 0;
    while index < samples.len() {
        if samples[index] > threshold {
            peaks.push(index as u64);
            index += separation;
        }
        index += 1;
    }
}

/// Sorts raw sample-index peaks, optionally converting them to milliseconds and
/// dropping duplicates together with the zero artifact.
pub fn normalize(mut peaks: Vec<u64>, sample_rate: u32, options: &PeakOptions) -> PeakSet {
    peaks.sort_unstable();
    let unit = if options.convert_to_milliseconds {
        let rate = sample_rate.max(1) as u64;
        for peak in peaks.iter_mut() {
            *peak = *peak * 1000 / rate;
        }
        PeakUnit::Milliseconds
    } else {
        PeakUnit::Samples
    };
    if options.remove_duplicates {
        peaks.dedup();
        peaks.retain(|peak| *peak > 0);
    }
    PeakSet::sorted(peaks, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulses(sample_rate: u32, seconds: usize, every: usize, height: f32) -> SampleBuffer {
        let mut samples = vec![0.0; sample_rate as usize * seconds];
        for index in (every..samples.len()).step_by(every) {
            samples[index] = height;
        }
        SampleBuffer::from_samples(sample_rate, samples).unwrap()
    }

    #[test]
    fn scan_skips_separation_window() {
        let samples = [0.0, 1.0, 1.0, 1.0, 0.0, 1.0];
        let mut peaks = Vec::new();
        scan_above(&samples, 0.5, 2, &mut peaks);
        assert_eq!(peaks, vec![1, 5]);
    }

    #[test]
    fn detects_impulse_train() {
        let buffer = impulses(1_000, 4, 500, 1.0);
        let peaks = PeakDetector::default().detect(&buffer).unwrap();
        assert_eq!(peaks, vec![500, 1_000, 1_500, 2_000, 2_500, 3_000, 3_500]);
    }

    #[test]
    fn lower_passes_pick_up_quieter_peaks() {
        // 10 s allows up to 10 collected peaks before the passes stop
        let mut samples = vec![0.0; 10_000];
        samples[1_000] = 1.0;
        samples[2_000] = 0.7;
        samples[3_000] = 0.7;
        let buffer = SampleBuffer::from_samples(1_000, samples).unwrap();
        let peaks = PeakDetector::default().detect(&buffer).unwrap();
        assert!(peaks.contains(&2_000));
        assert!(peaks.contains(&3_000));
        assert!(peaks.windows(2).all(|w| w[0] <= w[1]));
        assert!(peaks.iter().filter(|p| **p == 1_000).count() > 1);
    }

    #[test]
    fn detector_rejects_stalled_threshold() {
        for step in [0.0, -0.05] {
            let tuning = DetectorTuning {
                threshold_step: step,
                ..Default::default()
            };
            assert!(PeakDetector::new(tuning).is_err());
        }
        assert!(PeakDetector::new(DetectorTuning::default()).is_ok());
    }

    #[test]
    fn silent_buffer_has_no_peaks() {
        let buffer = SampleBuffer::from_samples(1_000, vec![0.0; 3_000]).unwrap();
        assert!(PeakDetector::default().detect(&buffer).unwrap().is_empty());
    }

    #[test]
    fn short_buffer_has_no_peaks() {
        let mut samples = vec![0.0; 200];
        samples[100] = 1.0;
        let buffer = SampleBuffer::from_samples(1_000, samples).unwrap();
        assert!(PeakDetector::default().detect(&buffer).unwrap().is_empty());
    }

    #[test]
    fn empty_buffer_is_an_error() {
        let buffer = SampleBuffer::new(1_000, 1.0, Vec::new()).unwrap();
        assert_eq!(
            PeakDetector::default().detect(&buffer),
            Err(AnalysisError::EmptyBuffer)
        );
    }

    #[test]
    fn normalize_converts_and_deduplicates() {
        let raw = vec![44_100, 0, 22_050, 22_060, 44_100];
        let set = normalize(raw, 44_100, &PeakOptions::default());
        assert_eq!(set.unit(), PeakUnit::Milliseconds);
        assert_eq!(set.values(), &[500, 1_000]);
        assert!(set.is_strictly_increasing());
    }

    #[test]
    fn normalize_respects_disabled_options() {
        let options = PeakOptions {
            convert_to_milliseconds: false,
            remove_duplicates: false,
        };
        let set = normalize(vec![30, 0, 10, 10], 1_000, &options);
        assert_eq!(set.unit(), PeakUnit::Samples);
        assert_eq!(set.values(), &[0, 10, 10, 30]);
    }
}
