use thiserror::Error;

use crate::peaks::PeakUnit;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }
}

/// Failures of the tempo analysis stages. None of these are retried internally.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("sample buffer is empty")]
    EmptyBuffer,
    #[error("at least 2 peaks are required to form an interval, found {found}")]
    InsufficientPeaks { found: usize },
    #[error("no dominant interval between peaks, tempo is indeterminate")]
    NoDominantInterval,
    #[error("peaks are expressed in {found:?}, expected {expected:?}")]
    UnitMismatch { expected: PeakUnit, found: PeakUnit },
}
