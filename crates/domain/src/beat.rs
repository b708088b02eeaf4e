use serde::{Deserialize, Serialize};
use time::Duration;

use crate::DomainError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "RawBeatEstimate")]
pub struct BeatEstimate {
    period_ms: u64,
    bpm: u32,
}

#[derive(Deserialize)]
struct RawBeatEstimate {
    period_ms: u64,
    bpm: u32,
}

impl TryFrom<RawBeatEstimate> for BeatEstimate {
    type Error = DomainError;

    fn try_from(raw: RawBeatEstimate) -> Result<Self, Self::Error> {
        let estimate = Self::from_period(raw.period_ms)?;
        if estimate.bpm != raw.bpm {
            return Err(DomainError::validation(format!(
                "{} bpm does not match a {} ms period",
                raw.bpm, raw.period_ms
            )));
        }
        Ok(estimate)
    }
}

impl BeatEstimate {
    pub fn from_period(period_ms: u64) -> Result<Self, DomainError> {
        if period_ms == 0 {
            return Err(DomainError::validation("beat period must be positive"));
        }
        let bpm = (60_000.0 / period_ms as f64).round() as u32;
        Ok(Self { period_ms, bpm })
    }

    /// Milliseconds between consecutive beats.
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Beats per minute, `round(60000 / period_ms)`.
    pub fn bpm(&self) -> u32 {
        self.bpm
    }
}

/// Predicted beat timestamps in milliseconds, spaced exactly one period apart.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BeatGrid {
    pub(crate) period_ms: u64,
    pub(crate) beats: Vec<u64>,
}

impl BeatGrid {
    pub fn empty(period_ms: u64) -> Self {
        Self {
            period_ms,
            beats: Vec::new(),
        }
    }

    /// Every multiple of `period_ms` from `first` to `last` inclusive.
    pub fn spanning(first: u64, last: u64, period_ms: u64) -> Result<Self, DomainError> {
        if period_ms == 0 {
            return Err(DomainError::validation("beat period must be positive"));
        }
        if last < first {
            return Err(DomainError::validation(
                "beat grid must end after it starts",
            ));
        }
        let beats = (first..=last).step_by(period_ms as usize).collect();
        Ok(Self { period_ms, beats })
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn beats(&self) -> &[u64] {
        &self.beats
    }

    pub fn first(&self) -> Option<u64> {
        self.beats.first().copied()
    }

    pub fn last(&self) -> Option<u64> {
        self.beats.last().copied()
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn beat_at(&self, index: usize) -> Option<Duration> {
        self.beats
            .get(index)
            .map(|ms| Duration::milliseconds(*ms as i64))
    }
}
