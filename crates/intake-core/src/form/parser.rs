//! Consultation form parser: extraction, mapping and validation of one page.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::IntakeConfig;
use crate::models::fields::ExtractedFields;
use crate::models::page::RecognizedPage;
use crate::models::record::CanonicalRecord;

use super::mapper::RecordMapper;
use super::rules::{ChoiceExtractor, FieldExtractor, NotesExtractor, OcrCorrections, ScalarExtractor};
use super::validator::{validate, ValidationResult};
use super::{FormExtractor, Result};

/// A page turned into a canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedForm {
    /// Page the record came from.
    pub page_number: u32,

    /// Everything the extractors found, before defaults.
    #[serde(rename = "raw_parsed_data")]
    pub fields: ExtractedFields,

    /// Mapped record, before validation defaults.
    #[serde(rename = "smartsheet_data")]
    pub record: CanonicalRecord,

    /// OCR confidence of the source page (0 - 100).
    pub confidence: f32,

    /// Validation verdict; `validation.data` is the record to submit.
    pub validation: ValidationResult,
}

/// Rule-based consultation form parser.
#[derive(Debug, Clone, Default)]
pub struct FormParser {
    scalars: ScalarExtractor,
    choices: ChoiceExtractor,
    notes: NotesExtractor,
    mapper: RecordMapper,
}

impl FormParser {
    /// Create a parser with built-in rules and default program values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from pipeline configuration.
    pub fn from_config(config: &IntakeConfig) -> Self {
        let corrections = OcrCorrections::from(&config.extraction);

        Self {
            scalars: ScalarExtractor::new().with_corrections(corrections),
            choices: ChoiceExtractor::new(),
            notes: NotesExtractor::new()
                .with_corrections(corrections)
                .with_min_length(config.extraction.min_notes_length),
            mapper: RecordMapper::new(config.program.clone()),
        }
    }

    /// Replace the scalar field extractor.
    pub fn with_scalars(mut self, scalars: ScalarExtractor) -> Self {
        self.scalars = scalars;
        self
    }

    /// Replace the choice-group extractor.
    pub fn with_choices(mut self, choices: ChoiceExtractor) -> Self {
        self.choices = choices;
        self
    }

    /// Run every extractor over the text.
    pub fn extract_fields(&self, text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::new();

        self.scalars.extract_all(text, &mut fields);
        self.choices.extract_all(text, &mut fields);
        self.notes.extract_all(text, &mut fields);

        fields
    }

    fn parse_text(&self, text: &str, page_number: u32, confidence: f32) -> ParsedForm {
        let start = Instant::now();

        let fields = self.extract_fields(text);
        let record = self.mapper.map(&fields);
        let validation = validate(record.clone());

        debug!(
            fields = fields.len(),
            valid = validation.is_valid,
            elapsed_us = start.elapsed().as_micros() as u64,
            "parsed page {}",
            page_number
        );

        ParsedForm {
            page_number,
            fields,
            record,
            confidence,
            validation,
        }
    }
}

impl FormExtractor for FormParser {
    fn extract(&self, page: &RecognizedPage) -> Result<ParsedForm> {
        if !page.success {
            let reason = page
                .error
                .clone()
                .unwrap_or_else(|| "no text recognized".to_string());
            return Err(ExtractionError::OcrFailed(reason));
        }

        info!(
            "Parsing page {} from {} characters of text",
            page.page_number,
            page.raw_text.len()
        );

        Ok(self.parse_text(&page.raw_text, page.page_number, page.confidence))
    }

    fn extract_from_text(&self, text: &str) -> Result<ParsedForm> {
        Ok(self.parse_text(text, 1, 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields::FieldName;
    use pretty_assertions::assert_eq;

    const SAMPLE_FORM: &str = "
    Client Consultation Form

    Business Name: Plena Mercancia
    Contact Name: Daphne
    City: Chicago
    Zip: 60622
    Business Structure: LLC
    Business Stage: X Growth Phase
    Business Presence: X Brick and Mortar
    Years in business: 6-1
    Full time employees: 2
    Race: X White
    Ethnicity: X Hispanic / Latino
    Language of Consultation: X Spanish
    Session Date: 07/08/2025
    Advisor: Wesley O.
    Contact Time: 2

    Consultation Notes:
    Met with client to discuss upcoming events and their plans. Discussed
    some marketing ideas and ways to drive more clients to his shop.
    ";

    #[test]
    fn test_parse_sample_form() {
        let parser = FormParser::new();
        let parsed = parser
            .extract(&RecognizedPage::new(1, SAMPLE_FORM, 85.0))
            .unwrap();

        let record = &parsed.record;
        assert_eq!(record.business_name, "Plena Mercancia");
        assert_eq!(record.business_owner_first_name, "Daphne");
        assert_eq!(record.business_owner_last_name, "");
        assert_eq!(record.zip_code, "60622");
        assert_eq!(record.business_structure, "LLC");
        assert_eq!(record.business_stage, "Growth Phase");
        assert_eq!(record.business_presence, "Brick and Mortar");
        assert_eq!(record.years_in_business, "6-1");
        assert_eq!(record.employee_count, "2 employees");
        assert_eq!(record.race, "White");
        assert_eq!(record.ethnicity, "Hispanic / Latino");
        assert_eq!(record.consultation_language, "Spanish");
        assert_eq!(record.consultation_date, "07/08/2025");
        assert_eq!(record.consultation_length, "2");
        assert_eq!(record.advisor_name, "Wesley O.");
        assert_eq!(
            record.business_summary,
            "Met with client to discuss upcoming events and their plans. Discussed \
             some marketing ideas and ways to drive more clients to his shop."
        );

        assert_eq!(parsed.confidence, 85.0);
        assert!(parsed.validation.is_valid);
    }

    #[test]
    fn test_minimal_form() {
        let parser = FormParser::new();
        let parsed = parser
            .extract_from_text("Business Name: Acme Co\nZip: 60622\nSession Date: 07/08/2025")
            .unwrap();

        assert_eq!(parsed.record.business_name, "Acme Co");
        assert_eq!(parsed.record.zip_code, "60622");
        assert_eq!(parsed.record.consultation_date, "07/08/2025");
        assert_eq!(parsed.record.race, "Prefer not to answer");
        assert_eq!(parsed.record.ethnicity, "Prefer not to answer");
        assert_eq!(parsed.record.gender, "Prefer not to answer");
        assert_eq!(parsed.record.is_veteran, "No");
        assert_eq!(parsed.record.is_disabled, "No");

        // No contact name on the page, so the owner's first name is missing.
        assert!(!parsed.validation.is_valid);
        assert_eq!(
            parsed.validation.missing_fields,
            vec!["business_owner_first_name".to_string()]
        );
    }

    #[test]
    fn test_missing_business_name() {
        let parser = FormParser::new();
        let parsed = parser
            .extract_from_text("Contact Name: Ana Lopez\nSession Date: 07/08/2025")
            .unwrap();

        assert!(!parsed.validation.is_valid);
        assert_eq!(parsed.validation.missing_fields, vec!["business_name".to_string()]);
    }

    #[test]
    fn test_ocr_failure() {
        let parser = FormParser::new();
        let result = parser.extract(&RecognizedPage::failed(3, "page too dark"));
        assert_eq!(
            result.unwrap_err(),
            ExtractionError::OcrFailed("page too dark".to_string())
        );
    }

    #[test]
    fn test_extract_fields_omits_absent_fields() {
        let parser = FormParser::new();
        let fields = parser.extract_fields("Business Stage: X Growth Phase");

        assert_eq!(
            fields.choices(FieldName::BusinessStage),
            &["Growth Phase".to_string()]
        );
        assert!(!fields.contains(FieldName::BusinessName));
        assert!(!fields.contains(FieldName::ConsultationNotes));
    }

    #[test]
    fn test_zero_correction_leaves_numeric_fields() {
        let mut config = IntakeConfig::default();
        config.extraction.correct_zero_glyph = true;
        let parser = FormParser::from_config(&config);

        let parsed = parser
            .extract_from_text("Business Name: B0dega 10\nContact Name: Ana\nSession Date: 07/08/2025")
            .unwrap();

        assert_eq!(parsed.record.business_name, "BOdega 1O");
        assert_eq!(parsed.record.consultation_date, "07/08/2025");
    }
}
