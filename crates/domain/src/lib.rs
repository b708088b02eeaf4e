pub mod beat;
pub mod buffer;
pub mod error;
pub mod io;
pub mod peaks;
pub mod report;

pub use crate::beat::{BeatEstimate, BeatGrid};
pub use crate::buffer::SampleBuffer;
pub use crate::error::{AnalysisError, DomainError};
pub use crate::io::{ExportFormat, JsonExporter, ReportExporter};
pub use crate::peaks::{PeakSet, PeakUnit};
pub use crate::report::AnalysisReport;
