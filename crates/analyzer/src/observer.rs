use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AnalysisStatus {
    Decoding,
    Filtering,
    DetectingPeaks,
    EstimatingTempo,
    ExtrapolatingGrid,
    Complete,
}

/// Receives pipeline transitions synchronously, on the analysing thread.
pub trait StatusObserver {
    fn on_status(&self, status: AnalysisStatus);
}

pub struct NullObserver;

impl StatusObserver for NullObserver {
    fn on_status(&self, _status: AnalysisStatus) {}
}

pub struct TracingObserver;

impl StatusObserver for TracingObserver {
    fn on_status(&self, status: AnalysisStatus) {
        info!(?status, "analysis status changed");
    }
}

impl<F> StatusObserver for F
where
    F: Fn(AnalysisStatus),
{
    fn on_status(&self, status: AnalysisStatus) {
        self(status)
    }
}
