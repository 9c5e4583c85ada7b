//! Core library for consultation intake form processing.
//!
//! This crate provides:
//! - Rule-based field, choice-group and notes extraction from OCR text
//! - Date normalization to `MM/DD/YYYY`
//! - Mapping to the canonical reporting record, with program defaults
//! - Record validation and CRM payload mapping
//! - A parallel page pipeline and sequential submission planning
//!
//! OCR itself is not part of this crate: pages arrive as already
//! recognized text with a confidence score.

pub mod error;
pub mod form;
pub mod models;
pub mod pipeline;

pub use error::{ExtractionError, IntakeError, Result};
pub use form::{FormExtractor, FormParser, ParsedForm, RecordMapper, ValidationResult, validate};
pub use models::{
    CanonicalRecord, CrmPayload, ExtractedFields, FieldName, FieldValue, IntakeConfig,
    RecognizedPage,
};
pub use pipeline::{
    PageOutcome, SubmissionOutcome, SubmissionPlan, SubmissionSummary, process_document,
    process_page,
};
