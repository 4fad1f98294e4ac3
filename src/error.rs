use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Missing machine metadata file {path}: {source}")]
    MissingMetadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing report template {path}: {source}")]
    MissingTemplate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Malformed result file {path}: {reason}")]
    MalformedResult { path: PathBuf, reason: String },

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown benchmark case: {0}")]
    UnknownCase(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    /// Errors that only invalidate a single result file or chart.
    ///
    /// The pipeline logs these and carries on; everything else aborts the
    /// run before the report is written.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Csv { .. }
                | Self::Json { .. }
                | Self::MalformedResult { .. }
                | Self::Plot(_)
                | Self::FontUnavailable(_)
        )
    }
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ReportError
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Self::Plot(err.to_string())
    }
}
