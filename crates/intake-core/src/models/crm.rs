//! CRM field mapping for a canonical record.
//!
//! Only the mapping lives here; transports are owned by the caller.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::form::rules::remap::industry_for_presence;
use crate::form::rules::dates::CANONICAL_FORMAT;
use crate::models::record::CanonicalRecord;

const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

/// Payload mirrored into the CRM for one consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmPayload {
    pub company: CrmCompany,
    pub contact: CrmContact,
    pub consultation: CrmConsultation,
    pub metadata: CrmMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmCompany {
    pub name: String,
    pub address: CrmAddress,
    pub industry: String,
    pub stage: String,
    pub structure: String,
    pub years_in_business: String,
    pub employee_count: String,
    pub custom_fields: CrmCompanyCustomFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmCompanyCustomFields {
    pub business_presence: String,
    pub service_areas: Vec<String>,
    pub referral_source: String,
    pub consultation_language: String,
    pub form_submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmContact {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub demographics: CrmDemographics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmDemographics {
    pub race: String,
    pub ethnicity: String,
    pub gender: String,
    pub is_veteran: bool,
    pub is_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmConsultation {
    pub date: String,
    pub duration: String,
    pub summary: String,
    pub advisor: String,
    pub program: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmMetadata {
    pub source: String,
    pub submitted_by: String,
    pub reporting_month: String,
    pub delegate_agency: String,
    pub vendor_id: String,
    pub processed_at: String,
}

impl CrmPayload {
    /// Map a canonical record into CRM sections.
    ///
    /// `processed_at` stamps the metadata and stands in for a missing
    /// consultation date.
    pub fn from_record(record: &CanonicalRecord, processed_at: NaiveDateTime) -> Self {
        let processed = processed_at.format(ISO_DATETIME).to_string();

        let date = if record.consultation_date.is_empty() {
            processed.clone()
        } else {
            NaiveDate::parse_from_str(&record.consultation_date, CANONICAL_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.format(ISO_DATETIME).to_string())
                .unwrap_or_else(|| record.consultation_date.clone())
        };

        Self {
            company: CrmCompany {
                name: record.business_name.clone(),
                address: CrmAddress {
                    street: record.business_street_address.clone(),
                    city: record.city.clone(),
                    state: record.state.clone(),
                    zip_code: record.zip_code.clone(),
                },
                industry: industry_for_presence(&record.business_presence).to_string(),
                stage: record.business_stage.clone(),
                structure: record.business_structure.clone(),
                years_in_business: record.years_in_business.clone(),
                employee_count: record.employee_count.clone(),
                custom_fields: CrmCompanyCustomFields {
                    business_presence: record.business_presence.clone(),
                    service_areas: record.service_areas.clone(),
                    referral_source: record.referral_source.clone(),
                    consultation_language: record.consultation_language.clone(),
                    form_submitted: true,
                },
            },
            contact: CrmContact {
                first_name: record.business_owner_first_name.clone(),
                last_name: record.business_owner_last_name.clone(),
                full_name: record.owner_full_name(),
                email: record.business_owner_email.clone(),
                phone: record.business_phone.clone(),
                demographics: CrmDemographics {
                    race: record.race.clone(),
                    ethnicity: record.ethnicity.clone(),
                    gender: record.gender.clone(),
                    is_veteran: record.is_veteran == "Yes",
                    is_disabled: record.is_disabled == "Yes",
                },
            },
            consultation: CrmConsultation {
                date,
                duration: record.consultation_length.clone(),
                summary: record.business_summary.clone(),
                advisor: record.submitted_by.clone(),
                program: record.program.clone(),
                kind: "Business Consultation".to_string(),
                status: "Completed".to_string(),
            },
            metadata: CrmMetadata {
                source: "Intake Automation".to_string(),
                submitted_by: record.submitted_by.clone(),
                reporting_month: record.reporting_month.clone(),
                delegate_agency: record.delegate_agency.clone(),
                vendor_id: record.vendor_id.clone(),
                processed_at: processed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::RecordMapper;
    use crate::models::fields::{ExtractedFields, FieldName};

    fn processed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn record() -> CanonicalRecord {
        let mut fields = ExtractedFields::new();
        fields.insert_text(FieldName::BusinessName, "Plena Mercancia");
        fields.insert_text(FieldName::ContactName, "Daphne Rivera Soto");
        fields.insert_text(FieldName::SessionDate, "07/08/2025");
        fields.insert_text(FieldName::Phone, "773-555-0142");
        fields.insert_choices(FieldName::Veteran, vec!["Yes".to_string()]);
        fields.insert_choices(FieldName::BusinessPresence, vec!["Home based".to_string()]);
        RecordMapper::default().map(&fields)
    }

    #[test]
    fn test_payload_sections() {
        let payload = CrmPayload::from_record(&record(), processed_at());

        assert_eq!(payload.company.name, "Plena Mercancia");
        assert_eq!(payload.company.industry, "Service");
        assert_eq!(payload.contact.full_name, "Daphne Rivera Soto");
        assert_eq!(payload.contact.phone, "773-555-0142");
        assert!(payload.contact.demographics.is_veteran);
        assert!(!payload.contact.demographics.is_disabled);
        assert_eq!(payload.consultation.date, "2025-07-08T00:00:00");
        assert_eq!(payload.metadata.processed_at, "2025-08-01T09:30:00");
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        let mut record = record();
        record.consultation_date = "July 8th".to_string();
        let payload = CrmPayload::from_record(&record, processed_at());
        assert_eq!(payload.consultation.date, "July 8th");

        record.consultation_date.clear();
        let payload = CrmPayload::from_record(&record, processed_at());
        assert_eq!(payload.consultation.date, "2025-08-01T09:30:00");
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_value(CrmPayload::from_record(&record(), processed_at())).unwrap();

        assert_eq!(json["company"]["address"]["zipCode"], "");
        assert_eq!(json["company"]["customFields"]["formSubmitted"], true);
        assert_eq!(json["consultation"]["type"], "Business Consultation");
        assert_eq!(json["contact"]["demographics"]["isVeteran"], true);
    }
}
