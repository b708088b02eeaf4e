//! End-to-end checks over synthetic impulse trains.

use pulse_analyzer::{
    detect_significant_peaks, estimate_beat, extrapolate_beat_grid, AnalysisConfig,
    AnalysisPipeline, NullObserver, PeakOptions,
};
use pulse_domain::{AnalysisError, BeatEstimate, PeakUnit, SampleBuffer};

/// Silent buffer with a unit impulse every `every_ms`, starting at zero.
fn impulse_train(sample_rate: u32, seconds: u32, every_ms: u32) -> SampleBuffer {
    let mut samples = vec![0.0f32; (sample_rate * seconds) as usize];
    let step = (sample_rate as u64 * every_ms as u64 / 1000) as usize;
    for index in (0..samples.len()).step_by(step) {
        samples[index] = 1.0;
    }
    SampleBuffer::new(sample_rate, seconds as f64, samples).unwrap()
}

#[test]
fn impulses_every_half_second() {
    let buffer = impulse_train(44_100, 10, 500);

    let peaks = detect_significant_peaks(&buffer, &PeakOptions::default()).unwrap();
    assert_eq!(peaks.unit(), PeakUnit::Milliseconds);
    assert!((19..=20).contains(&peaks.len()), "found {} peaks", peaks.len());
    assert!(peaks.is_strictly_increasing());
    assert!(peaks
        .values()
        .windows(2)
        .all(|w| (499..=501).contains(&(w[1] - w[0]))));

    let beat = estimate_beat(&peaks).unwrap();
    assert_eq!(beat, BeatEstimate::from_period(500).unwrap());
    assert_eq!(beat.bpm(), 120);

    let grid = extrapolate_beat_grid(buffer.duration_ms(), &peaks, &beat).unwrap();
    assert_eq!(grid.first(), Some(500));
    assert_eq!(grid.last(), Some(10_000));
    assert_eq!(grid.len(), 20);
    assert!(grid.beats().windows(2).all(|w| w[1] - w[0] == 500));
}

#[test]
fn silent_buffer_has_no_tempo() {
    let buffer = SampleBuffer::from_samples(44_100, vec![0.0; 44_100 * 3]).unwrap();
    let peaks = detect_significant_peaks(&buffer, &PeakOptions::default()).unwrap();
    assert!(peaks.is_empty());
    assert_eq!(
        estimate_beat(&peaks),
        Err(AnalysisError::InsufficientPeaks { found: 0 })
    );
}

#[test]
fn buffer_shorter_than_a_beat_has_no_tempo() {
    let mut samples = vec![0.0; 8_820];
    samples[4_410] = 1.0;
    let buffer = SampleBuffer::from_samples(44_100, samples).unwrap();
    let peaks = detect_significant_peaks(&buffer, &PeakOptions::default()).unwrap();
    assert!(peaks.is_empty());
    assert!(matches!(
        estimate_beat(&peaks),
        Err(AnalysisError::InsufficientPeaks { .. })
    ));
}

#[test]
fn estimation_is_deterministic() {
    let buffer = impulse_train(22_050, 12, 600);
    let peaks = detect_significant_peaks(&buffer, &PeakOptions::default()).unwrap();
    let first = estimate_beat(&peaks).unwrap();
    for _ in 0..3 {
        assert_eq!(estimate_beat(&peaks).unwrap(), first);
    }
    assert_eq!(first.period_ms(), 600);
    assert_eq!(first.bpm(), 100);
}

#[test]
fn report_keeps_requested_peak_units() {
    let mut config = AnalysisConfig::default();
    config.peaks.convert_to_milliseconds = false;
    let pipeline = AnalysisPipeline::with_observer(config, NullObserver).unwrap();
    let buffer = impulse_train(8_000, 6, 500);

    let report = pipeline.analyze_buffer(&buffer).unwrap();
    assert_eq!(report.peaks.unit(), PeakUnit::Samples);
    assert_eq!(report.peaks.values()[0], 4_000);
    assert_eq!(report.beat.bpm(), 120);
    assert_eq!(report.duration_ms, 6_000);
    assert!(!report.grid.is_empty());
}

#[test]
fn stalled_threshold_tuning_never_reaches_analysis() {
    let mut config = AnalysisConfig::default();
    config.detector.threshold_step = 0.0;
    assert!(AnalysisPipeline::with_observer(config, NullObserver).is_err());
}
