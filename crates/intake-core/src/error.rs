//! Error types for the intake-core library.

use thiserror::Error;

/// Main error type for the intake library.
#[derive(Error, Debug)]
pub enum IntakeError {
    /// Form field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning one recognized page into a record.
///
/// These never cross page boundaries: the pipeline converts them into a
/// failed outcome for the offending page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The OCR collaborator reported a failure for this page.
    #[error("OCR processing failed: {0}")]
    OcrFailed(String),

    /// A rule pattern could not be compiled.
    #[error("invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },

    /// A choice group was requested that has no registered options.
    #[error("unknown choice group: {0}")]
    UnknownChoiceGroup(String),
}

/// Result type for the intake library.
pub type Result<T> = std::result::Result<T, IntakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_display() {
        let err = ExtractionError::InvalidPattern {
            field: "zip".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "invalid pattern for zip: unclosed group");

        let wrapped: IntakeError = err.into();
        assert!(wrapped.to_string().starts_with("extraction error:"));
    }
}
