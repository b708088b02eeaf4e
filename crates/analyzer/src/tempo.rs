//! Tempo estimation from pairwise peak intervals.
//!
//! Every pair of peaks at least one beat interval apart votes for its gap. Gaps
//! whose vote count stands above the quadratic mean become candidates, one per
//! band, and the low candidates compete on how evenly the others divide by them.
//! The pair loop is quadratic in peak count, which detection bounds by
//! `duration / 0.230 s`.

use std::collections::BTreeMap;

use pulse_domain::{AnalysisError, BeatEstimate, DomainError, PeakSet, PeakUnit};
use tracing::debug;

use crate::config::TempoTuning;

/// Occurrence count per interval length in milliseconds.
pub type IntervalHistogram = BTreeMap<u64, u32>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub gap_ms: u64,
    pub count: u32,
}

#[derive(Clone, Debug, Default)]
pub struct TempoEstimator {
    tuning: TempoTuning,
}

impl TempoEstimator {
    pub fn new(tuning: TempoTuning) -> Result<Self, DomainError> {
        tuning.validate()?;
        Ok(Self { tuning })
    }

    pub fn estimate(&self, peaks: &PeakSet) -> Result<BeatEstimate, AnalysisError> {
        if peaks.unit() != PeakUnit::Milliseconds {
            return Err(AnalysisError::UnitMismatch {
                expected: PeakUnit::Milliseconds,
                found: peaks.unit(),
            });
        }
        if peaks.len() < 2 {
            return Err(AnalysisError::InsufficientPeaks { found: peaks.len() });
        }

        let histogram = self.interval_histogram(peaks.values());
        let significance =
            quadratic_mean(histogram.values()).ok_or(AnalysisError::NoDominantInterval)?;
        let candidates = self.candidates(&histogram, significance);
        let winner = self
            .pick_fundamental(&candidates)
            .ok_or(AnalysisError::NoDominantInterval)?;

        debug!(
            intervals = histogram.len(),
            significance,
            candidates = candidates.len(),
            period_ms = winner.gap_ms,
            "estimated beat period"
        );
        BeatEstimate::from_period(winner.gap_ms).map_err(|_| AnalysisError::NoDominantInterval)
    }

    /// Counts every gap of at least `min_interval_ms` between two peaks.
    pub fn interval_histogram(&self, peaks: &[u64]) -> IntervalHistogram {
        let mut histogram = IntervalHistogram::new();
        for (i, later) in peaks.iter().enumerate() {
            for earlier in &peaks[..i] {
                let gap = later.saturating_sub(*earlier);
                if gap >= self.tuning.min_interval_ms {
                    *histogram.entry(gap).or_insert(0) += 1;
                }
            }
        }
        histogram
    }

    /// Best supported gap per band among gaps counted more than `significance`
    /// times, in band order. Ties keep the shorter gap.
    pub fn candidates(&self, histogram: &IntervalHistogram, significance: f64) -> Vec<Candidate> {
        let mut bands: BTreeMap<u64, Candidate> = BTreeMap::new();
        for (&gap_ms, &count) in histogram {
            if count as f64 <= significance {
                continue;
            }
            let band = gap_ms / self.tuning.bucket_width_ms.max(1);
            let best = bands.entry(band).or_insert(Candidate { gap_ms, count });
            if count > best.count {
                *best = Candidate { gap_ms, count };
            }
        }
        bands.into_values().collect()
    }

    /// Among the first `reference_candidates` candidates, the one that leaves the
    /// smallest summed remainder when every candidate gap is divided by it.
    pub fn pick_fundamental(&self, candidates: &[Candidate]) -> Option<Candidate> {
        candidates
            .iter()
            .take(self.tuning.reference_candidates)
            .min_by_key(|reference| margin_score(candidates, reference.gap_ms))
            .copied()
    }
}

/// Sum of `gap mod reference` over all candidates.
pub fn margin_score(candidates: &[Candidate], reference_ms: u64) -> u64 {
    if reference_ms == 0 {
        return u64::MAX;
    }
    candidates
        .iter()
        .map(|candidate| candidate.gap_ms % reference_ms)
        .sum()
}

/// Root mean square of the counts, `None` when there are none.
fn quadratic_mean<'a>(counts: impl Iterator<Item = &'a u32>) -> Option<f64> {
    let (sum_of_squares, n) = counts.fold((0.0, 0usize), |(sum, n), count| {
        let count = *count as f64;
        (sum + count * count, n + 1)
    });
    (n > 0).then(|| (sum_of_squares / n as f64).sqrt())
}
