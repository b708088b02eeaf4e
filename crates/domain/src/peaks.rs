use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PeakUnit {
    /// Index into the sample buffer.
    Samples,
    /// Offset from the start of the track.
    Milliseconds,
}

/// Ascending peak positions.
///
/// Sets built through [`PeakSet::new`] are strictly increasing with no zero entry.
/// [`PeakSet::sorted`] only sorts, for callers that asked to keep duplicates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeakSet {
    unit: PeakUnit,
    values: Vec<u64>,
}

impl PeakSet {
    pub fn new(values: Vec<u64>, unit: PeakUnit) -> Result<Self, DomainError> {
        if values.first() == Some(&0) {
            return Err(DomainError::validation("peak set cannot contain zero"));
        }
        if values.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(DomainError::validation(
                "peak set must be strictly increasing",
            ));
        }
        Ok(Self { unit, values })
    }

    pub fn sorted(mut values: Vec<u64>, unit: PeakUnit) -> Self {
        values.sort_unstable();
        Self { unit, values }
    }

    pub fn unit(&self) -> PeakUnit {
        self.unit
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every entry is non-zero and greater than its predecessor.
    pub fn is_strictly_increasing(&self) -> bool {
        self.values.first() != Some(&0) && self.values.windows(2).all(|pair| pair[0] < pair[1])
    }
}
