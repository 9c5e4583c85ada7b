//! Consultation form extraction, mapping and validation.

mod mapper;
mod parser;
pub mod rules;
mod validator;

pub use mapper::{split_name, RecordMapper};
pub use parser::{FormParser, ParsedForm};
pub use validator::{validate, ValidationResult, REQUIRED_FIELDS};

use crate::error::ExtractionError;
use crate::models::page::RecognizedPage;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for consultation form extractors.
pub trait FormExtractor {
    /// Parse a recognized page into a validated record.
    fn extract(&self, page: &RecognizedPage) -> Result<ParsedForm>;

    /// Parse plain text as a single fully-confident page.
    fn extract_from_text(&self, text: &str) -> Result<ParsedForm>;
}
