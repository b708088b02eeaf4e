use pulse_domain::{AnalysisError, BeatEstimate, BeatGrid, PeakSet, PeakUnit};
use tracing::debug;

use crate::config::GridTuning;

/// Extends the longest evenly spaced run of peaks into a grid covering the track.
#[derive(Clone, Debug, Default)]
pub struct GridExtrapolator {
    tuning: GridTuning,
}

impl GridExtrapolator {
    pub fn new(tuning: GridTuning) -> Self {
        Self { tuning }
    }

    /// Peaks must be millisecond offsets. An empty grid means no two anchors
    /// lined up on the beat period.
    pub fn extrapolate(
        &self,
        duration_ms: u64,
        peaks: &PeakSet,
        beat: &BeatEstimate,
    ) -> Result<BeatGrid, AnalysisError> {
        if peaks.unit() != PeakUnit::Milliseconds {
            return Err(AnalysisError::UnitMismatch {
                expected: PeakUnit::Milliseconds,
                found: peaks.unit(),
            });
        }
        let period = beat.period_ms();
        let anchors = self.anchor_points(peaks.values(), period);
        let Some(chain) = self.longest_chain(&anchors, period) else {
            debug!(anchors = anchors.len(), "no anchor chain found");
            return Ok(BeatGrid::empty(period));
        };

        // walk back to the first beat in (0, period] and forward past the end
        let mut first = chain[0];
        if first > period {
            first -= (first - 1) / period * period;
        }
        let mut last = chain[chain.len() - 1];
        if last < duration_ms {
            last += (duration_ms - last).div_ceil(period) * period;
        }

        debug!(
            chain_len = chain.len(),
            first,
            last,
            period_ms = period,
            "extrapolated beat grid"
        );
        Ok(BeatGrid::spanning(first, last, period).unwrap_or_else(|_| BeatGrid::empty(period)))
    }

    /// Both ends of every peak pair exactly one period apart, sorted, keeping only
    /// points more than `min_anchor_spacing_ms` past their predecessor.
    pub fn anchor_points(&self, peaks: &[u64], period_ms: u64) -> Vec<u64> {
        let mut points = Vec::new();
        for (i, later) in peaks.iter().enumerate() {
            for earlier in &peaks[..i] {
                if later.checked_sub(*earlier) == Some(period_ms) {
                    points.push(*later);
                    points.push(*earlier);
                }
            }
        }
        points.sort_unstable();

        let spacing = self.tuning.min_anchor_spacing_ms;
        points
            .iter()
            .enumerate()
            .filter(|&(pos, point)| {
                (pos == 0 || *point > points[pos - 1] + spacing) && *point > 0
            })
            .map(|(_, point)| *point)
            .collect()
    }

    /// Longest run of consecutive anchors spaced one period apart (within
    /// tolerance). Earlier runs win ties.
    pub fn longest_chain<'a>(&self, anchors: &'a [u64], period_ms: u64) -> Option<&'a [u64]> {
        let mut best: Option<&'a [u64]> = None;
        let mut start = 0;
        for end in 0..anchors.len() {
            let continues = anchors
                .get(end + 1)
                .is_some_and(|next| self.is_aligned(anchors[end], *next, period_ms));
            if continues {
                continue;
            }
            let run = &anchors[start..=end];
            if run.len() >= 2 && best.map_or(true, |longest| run.len() > longest.len()) {
                best = Some(run);
            }
            start = end + 1;
        }
        best
    }

    fn is_aligned(&self, current: u64, next: u64, period_ms: u64) -> bool {
        (current + period_ms).abs_diff(next) <= self.tuning.chain_tolerance_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(values: Vec<u64>) -> PeakSet {
        PeakSet::new(values, PeakUnit::Milliseconds).unwrap()
    }

    fn beat(period_ms: u64) -> BeatEstimate {
        BeatEstimate::from_period(period_ms).unwrap()
    }

    #[test]
    fn anchors_collapse_shared_endpoints() {
        let extrapolator = GridExtrapolator::default();
        let anchors = extrapolator.anchor_points(&[500, 1_000, 1_100, 1_500, 3_000], 500);
        assert_eq!(anchors, vec![500, 1_000, 1_500]);
    }

    #[test]
    fn chain_reaching_the_last_anchor_counts() {
        let extrapolator = GridExtrapolator::default();
        let anchors = [500, 1_000, 1_500, 2_000];
        assert_eq!(extrapolator.longest_chain(&anchors, 500), Some(&anchors[..]));
    }

    #[test]
    fn longest_chain_wins() {
        let extrapolator = GridExtrapolator::default();
        let anchors = [400, 900, 3_000, 3_501, 3_999, 4_500, 9_000];
        assert_eq!(extrapolator.longest_chain(&anchors, 500), Some(&anchors[2..6]));
        assert_eq!(extrapolator.longest_chain(&[400, 1_000], 500), None);
        assert_eq!(extrapolator.longest_chain(&[], 500), None);
    }

    #[test]
    fn grid_extends_to_both_ends() {
        let extrapolator = GridExtrapolator::default();
        let peaks = millis(vec![700, 1_200, 1_700, 2_201, 2_701, 5_000]);
        let grid = extrapolator.extrapolate(4_000, &peaks, &beat(500)).unwrap();
        assert_eq!(grid.first(), Some(200));
        assert_eq!(grid.last(), Some(4_200));
        assert!(grid.beats().windows(2).all(|w| w[1] - w[0] == 500));
    }

    #[test]
    fn anchor_on_a_period_boundary_stays() {
        let extrapolator = GridExtrapolator::default();
        let peaks = millis((1..=4).map(|i| i * 500).collect());
        let grid = extrapolator.extrapolate(3_000, &peaks, &beat(500)).unwrap();
        assert_eq!(grid.beats(), &[500, 1_000, 1_500, 2_000, 2_500, 3_000]);
    }

    #[test]
    fn unaligned_peaks_give_empty_grid() {
        let extrapolator = GridExtrapolator::default();
        let peaks = millis(vec![300, 1_000, 1_800, 2_900]);
        let grid = extrapolator.extrapolate(4_000, &peaks, &beat(500)).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.period_ms(), 500);
    }

    #[test]
    fn sample_index_peaks_are_rejected() {
        let extrapolator = GridExtrapolator::default();
        let peaks = PeakSet::sorted(vec![22_050, 44_100, 66_150], PeakUnit::Samples);
        assert_eq!(
            extrapolator.extrapolate(2_000, &peaks, &beat(500)),
            Err(AnalysisError::UnitMismatch {
                expected: PeakUnit::Milliseconds,
                found: PeakUnit::Samples,
            })
        );
    }
}
