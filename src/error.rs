use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while managing, analyzing or reporting species data.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Index error: record {index} does not exist (dataset has {len} records)")]
    Index { index: usize, len: usize },

    #[error("Load error: could not load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Save error: {0}")]
    Save(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Report generation error: {0}")]
    ReportGeneration(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<calamine::Error> for TrackerError {
    fn from(e: calamine::Error) -> Self {
        TrackerError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for TrackerError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        TrackerError::Excel(e.to_string())
    }
}

impl From<printpdf::Error> for TrackerError {
    fn from(e: printpdf::Error) -> Self {
        TrackerError::Pdf(e.to_string())
    }
}

impl From<toml::de::Error> for TrackerError {
    fn from(e: toml::de::Error) -> Self {
        TrackerError::Config(e.to_string())
    }
}

impl TrackerError {
    /// Wrap any lower-level failure into a load error for `path`.
    pub(crate) fn load(path: impl Into<PathBuf>, cause: impl std::fmt::Display) -> Self {
        TrackerError::Load {
            path: path.into(),
            reason: cause.to_string(),
        }
    }

    /// Re-label a lower-level failure as a report generation error.
    pub(crate) fn into_report_error(self) -> Self {
        match self {
            TrackerError::ReportGeneration(_) => self,
            other => TrackerError::ReportGeneration(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = TrackerError::from(io_err);
        let msg = err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = TrackerError::Validation("Species is required".to_string());
        assert_eq!(err.to_string(), "Validation error: Species is required");
    }

    #[test]
    fn test_index_error_display() {
        let err = TrackerError::Index { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "Index error: record 7 does not exist (dataset has 3 records)"
        );
    }

    #[test]
    fn test_load_error_display() {
        let err = TrackerError::load("data/animals.xlsx", "permission denied");
        let msg = err.to_string();
        assert!(msg.starts_with("Load error"));
        assert!(msg.contains("animals.xlsx"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_no_data_display() {
        let err = TrackerError::NoData("no records for Jaguar".to_string());
        assert_eq!(err.to_string(), "No data: no records for Jaguar");
    }

    #[test]
    fn test_into_report_error_wraps_lower_level() {
        let err = TrackerError::Chart("backend failed".to_string()).into_report_error();
        assert!(matches!(err, TrackerError::ReportGeneration(_)));
        assert!(err.to_string().contains("backend failed"));
    }

    #[test]
    fn test_into_report_error_keeps_report_error() {
        let err = TrackerError::ReportGeneration("disk full".to_string()).into_report_error();
        assert_eq!(err.to_string(), "Report generation error: disk full");
    }

    #[test]
    fn test_json_error_from_conversion() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("not valid json{{{");
        let json_err = result.unwrap_err();
        let err: TrackerError = json_err.into();
        assert!(matches!(err, TrackerError::Json(_)));
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let result: Result<toml::Value, _> = toml::from_str("key = = 1");
        let err: TrackerError = result.unwrap_err().into();
        assert!(matches!(err, TrackerError::Config(_)));
    }
}
