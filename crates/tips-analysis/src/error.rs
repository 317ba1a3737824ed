//! Error types for the tipping analysis.
//!
//! The taxonomy mirrors the three failure classes of the run: loading the
//! dataset, writing a report document and rendering a chart. Every variant is
//! fatal for the artifact it concerns; nothing is retried.
//!
//! Errors are serializable as `{code, message}` so the `--json` output can
//! carry them alongside results.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for the analysis library.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input file missing, unreadable or malformed.
    #[error("Failed to load dataset '{}': {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// A required column is absent from the dataset.
    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    /// A report document could not be written.
    #[error("Failed to write report '{}': {reason}", path.display())]
    ReportWrite { path: PathBuf, reason: String },

    /// A chart backend failed.
    #[error("Failed to render chart '{chart}': {reason}")]
    Render { chart: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Build a load error for `path`.
    pub fn load(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        AnalysisError::Load {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Build a report write error for `path`.
    pub fn report_write(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        AnalysisError::ReportWrite {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Build a render error for the chart named `chart`.
    pub fn render(chart: impl Into<String>, reason: impl ToString) -> Self {
        AnalysisError::Render {
            chart: chart.into(),
            reason: reason.to_string(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, usable by callers consuming the JSON payload.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load { .. } => "LOAD_ERROR",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::ReportWrite { .. } => "REPORT_WRITE_ERROR",
            Self::Render { .. } => "RENDER_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error belongs to the load class (missing file, malformed
    /// content or schema mismatch).
    pub fn is_load_error(&self) -> bool {
        match self {
            Self::Load { .. } | Self::MissingColumn(_) => true,
            Self::WithContext { source, .. } => source.is_load_error(),
            _ => false,
        }
    }
}

impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            AnalysisError::load("data/tips.csv", "missing").error_code(),
            "LOAD_ERROR"
        );
        assert_eq!(
            AnalysisError::MissingColumn("tip".to_string()).error_code(),
            "MISSING_COLUMN"
        );
        assert_eq!(
            AnalysisError::render("01_total_bill_vs_tip", "backend").error_code(),
            "RENDER_ERROR"
        );
    }

    #[test]
    fn test_is_load_error() {
        assert!(AnalysisError::load("x.csv", "bad").is_load_error());
        assert!(AnalysisError::MissingColumn("size".to_string()).is_load_error());
        assert!(!AnalysisError::report_write("out.pdf", "disk full").is_load_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalysisError::MissingColumn("total_bill".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("MISSING_COLUMN"));
        assert!(json.contains("total_bill"));
    }

    #[test]
    fn test_with_context() {
        let error = AnalysisError::MissingColumn("tip".to_string()).with_context("While loading");
        assert!(error.to_string().contains("While loading"));
        assert_eq!(error.error_code(), "MISSING_COLUMN");
        assert!(error.is_load_error());
    }

    #[test]
    fn test_report_write_message_names_path() {
        let error = AnalysisError::report_write("reports/out.pdf", "permission denied");
        let message = error.to_string();
        assert!(message.contains("reports/out.pdf"));
        assert!(message.contains("permission denied"));
    }
}
