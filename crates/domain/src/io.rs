use serde::{Deserialize, Serialize};

use crate::{error::DomainError, report::AnalysisReport};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Yaml,
}

pub trait ReportExporter {
    fn export(&self, report: &AnalysisReport, format: ExportFormat)
        -> Result<Vec<u8>, DomainError>;
}

pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn export(
        &self,
        report: &AnalysisReport,
        format: ExportFormat,
    ) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::Json => serde_json::to_vec_pretty(report)
                .map_err(|err| DomainError::Serialization(err.to_string())),
            ExportFormat::Yaml => serde_yaml::to_string(report)
                .map(String::into_bytes)
                .map_err(|err| DomainError::Serialization(err.to_string())),
        }
    }
}
