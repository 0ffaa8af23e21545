//! Error types for the data quality pipeline.
//!
//! Every failure a run can hit is one variant of [`QualityError`]. Each run is
//! single-shot: any error ends the run and the caller reports it to the user.
//!
//! Errors serialize as `{ "code": ..., "message": ... }` so the web page and the
//! `--json` CLI output can show them without string matching.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Fixed message shown when a dataset has nothing the anomaly model can use.
pub const NO_NUMERIC_COLUMNS_MESSAGE: &str =
    "No numeric columns found in the dataset. Cannot perform anomaly detection.";

/// The main error type for a data quality run.
#[derive(Error, Debug)]
pub enum QualityError {
    /// The uploaded bytes could not be parsed as the declared format.
    #[error("Failed to parse {format} file: {reason}")]
    Parse { format: String, reason: String },

    /// The upload carried no usable file name or content.
    #[error("Unsupported upload: {0}")]
    UnsupportedFormat(String),

    /// The cleaned dataset has no integer or float columns.
    #[error("{message}", message = NO_NUMERIC_COLUMNS_MESSAGE)]
    NoNumericColumns,

    /// The cleaned dataset has no rows, so no score can be computed.
    #[error("The dataset has no rows after cleaning. Cannot compute a quality score.")]
    EmptyDataset,

    /// A numeric column has no non-missing values, so its mean is undefined.
    #[error("Numeric column '{0}' has no values; cannot fill its missing cells with a mean")]
    NoValidValues(String),

    /// The anomaly model could not be fitted on the numeric projection.
    #[error("Anomaly model could not be fitted: {0}")]
    ModelFit(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

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
        source: Box<QualityError>,
    },
}

impl QualityError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        QualityError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a parse error for the given format.
    pub fn parse(format: impl Into<String>, reason: impl ToString) -> Self {
        QualityError::Parse {
            format: format.into(),
            reason: reason.to_string(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "PARSE_FAILED",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::NoNumericColumns => "NO_NUMERIC_COLUMNS",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::ModelFit(_) => "MODEL_FIT_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error describes the uploaded data rather than a failure of
    /// the system. These are shown to the user as-is.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::Parse { .. }
            | Self::UnsupportedFormat(_)
            | Self::NoNumericColumns
            | Self::EmptyDataset
            | Self::NoValidValues(_)
            | Self::ModelFit(_) => true,
            Self::WithContext { source, .. } => source.is_data_error(),
            _ => false,
        }
    }

    /// Message without any context prefixes, for display next to an upload.
    pub fn user_message(&self) -> String {
        match self {
            Self::WithContext { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }
}

impl Serialize for QualityError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("QualityError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.user_message())?;
        state.end()
    }
}

/// Result type alias for data quality operations.
pub type Result<T> = std::result::Result<T, QualityError>;

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
        self.map_err(|e| QualityError::Polars(e).with_context(context))
    }
}
