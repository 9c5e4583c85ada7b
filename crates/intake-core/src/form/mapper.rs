//! Mapping from extracted fields to the canonical record.

use crate::models::config::ProgramConfig;
use crate::models::fields::{ExtractedFields, FieldName};
use crate::models::record::CanonicalRecord;

use super::rules::dates::normalize_date;
use super::rules::remap::business_stage_label;

pub const DEFAULT_CONSULTATION_LENGTH: &str = "1";
pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_BUSINESS_STAGE: &str = "Growth Phase";
pub const DEFAULT_BUSINESS_STRUCTURE: &str = "Limited Liability Company";
pub const DEFAULT_BUSINESS_PRESENCE: &str = "Brick & Mortar";
pub const DEFAULT_YEARS_IN_BUSINESS: &str = "2 to 5 years";
pub const DEFAULT_EMPLOYEES: &str = "2";
pub const UNDISCLOSED: &str = "Prefer not to answer";
pub const DEFAULT_FLAG: &str = "No";

/// Split a contact name into first name and the remaining tokens.
pub fn split_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Total mapping from [`ExtractedFields`] to [`CanonicalRecord`].
///
/// Each attribute takes the extracted value when present, then the
/// attribute's default, then an empty string.
#[derive(Debug, Clone, Default)]
pub struct RecordMapper {
    program: ProgramConfig,
}

impl RecordMapper {
    /// Create a mapper stamping the given program values on every record.
    pub fn new(program: ProgramConfig) -> Self {
        Self { program }
    }

    pub fn map(&self, fields: &ExtractedFields) -> CanonicalRecord {
        let text = |field: FieldName| fields.text(field).unwrap_or_default().to_string();
        let text_or = |field: FieldName, default: &str| {
            fields.text(field).unwrap_or(default).to_string()
        };
        let first_choice_or = |group: FieldName, default: &str| {
            fields
                .choices(group)
                .first()
                .map(String::as_str)
                .unwrap_or(default)
                .to_string()
        };

        let (first_name, last_name) = split_name(fields.text(FieldName::ContactName).unwrap_or_default());

        let business_stage = fields
            .choices(FieldName::BusinessStage)
            .first()
            .map(|stage| business_stage_label(stage))
            .unwrap_or_else(|| DEFAULT_BUSINESS_STAGE.to_string());

        let employees = fields
            .text(FieldName::FullTimeEmployees)
            .unwrap_or(DEFAULT_EMPLOYEES);

        CanonicalRecord {
            delegate_agency: self.program.delegate_agency.clone(),
            vendor_id: self.program.vendor_id.clone(),
            program: self.program.program.clone(),
            submitted_by: self.program.submitted_by.clone(),
            reporting_month: self.program.reporting_month.clone(),

            business_name: text(FieldName::BusinessName),
            business_owner_first_name: first_name,
            business_owner_last_name: last_name,
            business_owner_email: text(FieldName::Email),
            business_phone: text(FieldName::Phone),
            business_street_address: text(FieldName::Address),
            city: text_or(FieldName::City, self.program.default_city.as_str()),
            state: self.program.state.clone(),
            zip_code: text(FieldName::Zip),

            consultation_date: normalize_date(fields.text(FieldName::SessionDate).unwrap_or_default()),
            consultation_length: text_or(FieldName::ContactTime, DEFAULT_CONSULTATION_LENGTH),
            consultation_language: first_choice_or(FieldName::Language, DEFAULT_LANGUAGE),
            advisor_name: text(FieldName::Advisor),

            business_stage,
            business_structure: text_or(FieldName::BusinessStructure, DEFAULT_BUSINESS_STRUCTURE),
            business_presence: first_choice_or(FieldName::BusinessPresence, DEFAULT_BUSINESS_PRESENCE),
            years_in_business: text_or(FieldName::YearsInBusiness, DEFAULT_YEARS_IN_BUSINESS),
            employee_count: format!("{} employees", employees),

            race: first_choice_or(FieldName::Race, UNDISCLOSED),
            ethnicity: first_choice_or(FieldName::Ethnicity, UNDISCLOSED),
            // Not asked on the paper form.
            gender: UNDISCLOSED.to_string(),
            is_veteran: first_choice_or(FieldName::Veteran, DEFAULT_FLAG),
            is_disabled: first_choice_or(FieldName::Disabled, DEFAULT_FLAG),

            service_areas: self.program.service_areas.clone(),
            business_summary: text(FieldName::ConsultationNotes),
            referral_source: self.program.referral_source.clone(),
        }
    }
}
