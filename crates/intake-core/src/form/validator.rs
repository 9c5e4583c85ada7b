//! Completeness check for canonical records.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::mapper::DEFAULT_CONSULTATION_LENGTH;
use crate::models::record::CanonicalRecord;

/// Reads one attribute of a record.
pub type Accessor = fn(&CanonicalRecord) -> &str;

/// Attributes a record cannot be submitted without, in reporting order.
pub const REQUIRED_FIELDS: [(&str, Accessor); 3] = [
    ("business_name", |r| r.business_name.as_str()),
    ("business_owner_first_name", |r| r.business_owner_first_name.as_str()),
    ("consultation_date", |r| r.consultation_date.as_str()),
];

/// Verdict on a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True exactly when no required field is missing.
    pub is_valid: bool,

    /// Missing required fields, in [`REQUIRED_FIELDS`] order.
    pub missing_fields: Vec<String>,

    /// Defaults applied during validation.
    pub warnings: Vec<String>,

    /// The record, with validation defaults applied.
    pub data: CanonicalRecord,
}

/// Check required fields and fill the consultation length default.
///
/// Required fields are only reported, never filled.
pub fn validate(mut record: CanonicalRecord) -> ValidationResult {
    let missing_fields: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|(_, value)| value(&record).trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect();

    let mut warnings = Vec::new();
    if record.consultation_length.trim().is_empty() {
        record.consultation_length = DEFAULT_CONSULTATION_LENGTH.to_string();
        warnings.push(format!(
            "Used default consultation length: {} hour",
            DEFAULT_CONSULTATION_LENGTH
        ));
    }

    if missing_fields.is_empty() {
        debug!(business = %record.business_name, "record passed validation");
    } else {
        warn!(
            business = %record.business_name,
            missing = ?missing_fields,
            "record is missing required fields"
        );
    }

    ValidationResult {
        is_valid: missing_fields.is_empty(),
        missing_fields,
        warnings,
        data: record,
    }
}
