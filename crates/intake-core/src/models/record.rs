//! Canonical consultation record submitted to the hosted form and the CRM.

use serde::{Deserialize, Serialize};

/// Schema-complete representation of one consultation form.
///
/// Every attribute is always present; unresolved values hold their default
/// (or an empty string). Built only by [`crate::form::RecordMapper`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    // Program and agency
    pub delegate_agency: String,
    pub vendor_id: String,
    pub program: String,
    pub submitted_by: String,
    pub reporting_month: String,

    // Business identity
    pub business_name: String,
    pub business_owner_first_name: String,
    pub business_owner_last_name: String,
    pub business_owner_email: String,
    pub business_phone: String,
    pub business_street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    // Consultation
    pub consultation_date: String,
    pub consultation_length: String,
    pub consultation_language: String,
    pub advisor_name: String,

    // Business characteristics
    pub business_stage: String,
    pub business_structure: String,
    pub business_presence: String,
    pub years_in_business: String,
    pub employee_count: String,

    // Demographics
    pub race: String,
    pub ethnicity: String,
    pub gender: String,
    pub is_veteran: String,
    pub is_disabled: String,

    // Services and summary
    pub service_areas: Vec<String>,
    pub business_summary: String,
    pub referral_source: String,
}

impl CanonicalRecord {
    /// Attribute names in schema order.
    pub const ATTRIBUTES: [&'static str; 31] = [
        "delegate_agency",
        "vendor_id",
        "program",
        "submitted_by",
        "reporting_month",
        "business_name",
        "business_owner_first_name",
        "business_owner_last_name",
        "business_owner_email",
        "business_phone",
        "business_street_address",
        "city",
        "state",
        "zip_code",
        "consultation_date",
        "consultation_length",
        "consultation_language",
        "advisor_name",
        "business_stage",
        "business_structure",
        "business_presence",
        "years_in_business",
        "employee_count",
        "race",
        "ethnicity",
        "gender",
        "is_veteran",
        "is_disabled",
        "service_areas",
        "business_summary",
        "referral_source",
    ];

    /// Attribute values in schema order, list values joined with `"; "`.
    pub fn values(&self) -> [String; 31] {
        [
            self.delegate_agency.clone(),
            self.vendor_id.clone(),
            self.program.clone(),
            self.submitted_by.clone(),
            self.reporting_month.clone(),
            self.business_name.clone(),
            self.business_owner_first_name.clone(),
            self.business_owner_last_name.clone(),
            self.business_owner_email.clone(),
            self.business_phone.clone(),
            self.business_street_address.clone(),
            self.city.clone(),
            self.state.clone(),
            self.zip_code.clone(),
            self.consultation_date.clone(),
            self.consultation_length.clone(),
            self.consultation_language.clone(),
            self.advisor_name.clone(),
            self.business_stage.clone(),
            self.business_structure.clone(),
            self.business_presence.clone(),
            self.years_in_business.clone(),
            self.employee_count.clone(),
            self.race.clone(),
            self.ethnicity.clone(),
            self.gender.clone(),
            self.is_veteran.clone(),
            self.is_disabled.clone(),
            self.service_areas.join("; "),
            self.business_summary.clone(),
            self.referral_source.clone(),
        ]
    }

    /// Owner name as written on the form.
    pub fn owner_full_name(&self) -> String {
        format!(
            "{} {}",
            self.business_owner_first_name, self.business_owner_last_name
        )
        .trim()
        .to_string()
    }
}
