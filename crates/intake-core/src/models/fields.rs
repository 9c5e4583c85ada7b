//! Field values pulled out of recognized text, before mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Names of everything the extractors can find on a consultation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    BusinessName,
    Dba,
    ContactName,
    Address,
    City,
    Zip,
    Phone,
    Email,
    BusinessStructure,
    YearsInBusiness,
    FullTimeEmployees,
    SessionDate,
    Advisor,
    ContactTime,
    TypeOfConsultation,
    BusinessStage,
    BusinessPresence,
    Race,
    Ethnicity,
    Language,
    Veteran,
    Disabled,
    ConsultationNotes,
}

impl FieldName {
    /// Scalar fields, in extraction order.
    pub const SCALARS: [FieldName; 15] = [
        FieldName::BusinessName,
        FieldName::Dba,
        FieldName::ContactName,
        FieldName::Address,
        FieldName::City,
        FieldName::Zip,
        FieldName::Phone,
        FieldName::Email,
        FieldName::BusinessStructure,
        FieldName::YearsInBusiness,
        FieldName::FullTimeEmployees,
        FieldName::SessionDate,
        FieldName::Advisor,
        FieldName::ContactTime,
        FieldName::TypeOfConsultation,
    ];

    /// Choice groups, in extraction order.
    pub const CHOICE_GROUPS: [FieldName; 7] = [
        FieldName::BusinessStage,
        FieldName::BusinessPresence,
        FieldName::Race,
        FieldName::Ethnicity,
        FieldName::Language,
        FieldName::Veteran,
        FieldName::Disabled,
    ];

    /// Snake-case name as used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::BusinessName => "business_name",
            FieldName::Dba => "dba",
            FieldName::ContactName => "contact_name",
            FieldName::Address => "address",
            FieldName::City => "city",
            FieldName::Zip => "zip",
            FieldName::Phone => "phone",
            FieldName::Email => "email",
            FieldName::BusinessStructure => "business_structure",
            FieldName::YearsInBusiness => "years_in_business",
            FieldName::FullTimeEmployees => "full_time_employees",
            FieldName::SessionDate => "session_date",
            FieldName::Advisor => "advisor",
            FieldName::ContactTime => "contact_time",
            FieldName::TypeOfConsultation => "type_of_consultation",
            FieldName::BusinessStage => "business_stage",
            FieldName::BusinessPresence => "business_presence",
            FieldName::Race => "race",
            FieldName::Ethnicity => "ethnicity",
            FieldName::Language => "language",
            FieldName::Veteran => "veteran",
            FieldName::Disabled => "disabled",
            FieldName::ConsultationNotes => "consultation_notes",
        }
    }

    /// Fields whose values carry digits. OCR letter corrections must not touch them.
    pub fn carries_digits(&self) -> bool {
        matches!(
            self,
            FieldName::Zip
                | FieldName::Phone
                | FieldName::Address
                | FieldName::Email
                | FieldName::YearsInBusiness
                | FieldName::FullTimeEmployees
                | FieldName::SessionDate
                | FieldName::ContactTime
        )
    }

    /// Whether this field is a choice group.
    pub fn is_choice_group(&self) -> bool {
        Self::CHOICE_GROUPS.contains(self)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extracted value or the selections of a choice group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Choices(Vec<String>),
}

/// Partial mapping from field name to extracted value.
///
/// Absence of a key is the normal "not found" signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedFields(BTreeMap<FieldName, FieldValue>);

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scalar value. Empty values are treated as absent.
    pub fn insert_text(&mut self, field: FieldName, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(field, FieldValue::Text(value));
        }
    }

    /// Record choice-group selections. An empty selection is treated as absent.
    pub fn insert_choices(&mut self, field: FieldName, selections: Vec<String>) {
        if !selections.is_empty() {
            self.0.insert(field, FieldValue::Choices(selections));
        }
    }

    pub fn get(&self, field: FieldName) -> Option<&FieldValue> {
        self.0.get(&field)
    }

    /// Scalar value of a field. A choice group yields its first selection.
    pub fn text(&self, field: FieldName) -> Option<&str> {
        match self.0.get(&field)? {
            FieldValue::Text(value) => Some(value.as_str()),
            FieldValue::Choices(values) => values.first().map(String::as_str),
        }
    }

    /// Selections of a choice group, empty when absent.
    pub fn choices(&self, field: FieldName) -> &[String] {
        match self.0.get(&field) {
            Some(FieldValue::Choices(values)) => values,
            _ => &[],
        }
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.0.iter()
    }
}
