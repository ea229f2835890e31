//! Error types for the CV redaction library.
//!
//! Only failures that abort a whole request live here. Partial extraction
//! failures are not errors: they are recorded as
//! [`Degradation`](crate::redaction::Degradation) entries on the outcome so the
//! caller can still receive a document.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for redaction operations.
pub type RedactorResult<T> = Result<T, RedactorError>;

/// Error type for all fatal redaction failures.
#[derive(Debug, Error)]
pub enum RedactorError {
    /// Input bytes are not a loadable document of the declared type.
    #[error("failed to parse {format} document: {reason}")]
    Parse { format: String, reason: String },

    /// The MIME type is not one the ingestion boundary recognises.
    #[error("unsupported document format '{mime}'")]
    UnsupportedFormat { mime: String },

    /// The request did not finish within its time budget.
    #[error("redaction timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// The request was abandoned, typically after its timeout fired.
    #[error("redaction cancelled")]
    Cancelled,

    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration or parameters
    #[error("invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// Mapping or configuration JSON could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific error (lopdf, zip, ...)
    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },
}

impl RedactorError {
    /// Shorthand for a PDF [`RedactorError::Parse`].
    pub fn pdf_parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            format: "PDF".to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true when the failure came from the input document itself
    /// rather than from the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::UnsupportedFormat { .. })
    }
}

impl From<lopdf::Error> for RedactorError {
    fn from(err: lopdf::Error) -> Self {
        Self::Backend {
            backend: "lopdf".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for RedactorError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidInput {
            parameter: "pattern".to_string(),
            reason: err.to_string(),
        }
    }
}
