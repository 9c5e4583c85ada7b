//! Pattern tables for consultation form extraction.
//!
//! Field patterns are listed per field in priority order: labelled patterns
//! first, loose fallbacks last. They are compiled case-insensitive and
//! multi-line by [`super::fields::FieldRules`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::fields::FieldName;

/// Ordered pattern sources per scalar field.
pub const FIELD_PATTERNS: &[(FieldName, &[&str])] = &[
    (
        FieldName::BusinessName,
        &[
            r"\bBusiness\s+Name[:\s]+([^\n\r]+)",
            r"\bBusiness\s*Name[:\s]*([^\n\r]+)",
        ],
    ),
    (
        FieldName::Dba,
        &[r"\bDBA[:\s]+([^\n\r]+)", r"\bD\.?B\.?A\.?[:\s]*([^\n\r]+)"],
    ),
    (
        FieldName::ContactName,
        &[
            r"\bContact\s+Name[:\s]+([^\n\r]+)",
            r"\bContact\s*Name[:\s]*([^\n\r]+)",
        ],
    ),
    (
        FieldName::Address,
        &[r"\bAddress[:\s]+([^\n\r]+)", r"\bAddress[:\s]*([^\n\r]+)"],
    ),
    (
        FieldName::City,
        &[r"\bCity[:\s]+([^\n\r]+)", r"\bCity[:\s]*([^\n\r]+)"],
    ),
    (
        FieldName::Zip,
        &[r"\bZip[:\s]+(\d{5})", r"\bZip\s*Code[:\s]*(\d{5})"],
    ),
    (
        FieldName::Phone,
        &[r"\bPhone[:\s]+([^\n\r]+)", r"\bPhone[:\s]*([^\n\r]+)"],
    ),
    (
        FieldName::Email,
        &[r"\bEmail[:\s]+([^\n\r]+)", r"\bE[\-\s]*mail[:\s]*([^\n\r]+)"],
    ),
    (
        FieldName::BusinessStructure,
        &[
            r"\bBusiness\s+Structure[:\s]+([^\n\r]+)",
            r"\b(?:LLC|S[\-\s]*CORP|Corporation|Partnership|Sole\s+Proprietorship)\b",
        ],
    ),
    (
        FieldName::YearsInBusiness,
        &[
            r"\bYears\s+in\s+business[:\s]+([^\n\r]+)",
            r"(\d+\s*-\s*\d+|\d+)",
        ],
    ),
    (
        FieldName::FullTimeEmployees,
        &[
            r"\bFull\s+time\s+employees[:\s]+([^\n\r]+)",
            r"\bFull[\s\-]*time\s+employees[:\s]*(\d+)",
        ],
    ),
    (
        FieldName::SessionDate,
        &[
            r"\bSession\s+Date[:\s]+([^\n\r]+)",
            r"(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})",
        ],
    ),
    (
        FieldName::Advisor,
        &[r"\bAdvisor[:\s]+([^\n\r]+)", r"\bAdvisor[:\s]*([^\n\r]+)"],
    ),
    (
        FieldName::ContactTime,
        &[
            r"\bContact\s+Time[:\s]+([^\n\r]+)",
            r"\bContact\s*Time[:\s]*(\d+)",
        ],
    ),
    (
        FieldName::TypeOfConsultation,
        &[
            r"\bType\s+of\s+Consultation[:\s]+([^\n\r]+)",
            r"\b(?:operations|marketing|financing|legal|accounting)\b",
        ],
    ),
];

/// Registered options per choice group, in form order.
pub const CHOICE_OPTIONS: &[(FieldName, &[&str])] = &[
    (
        FieldName::BusinessStage,
        &[
            "Seed/Idea Phase",
            "Start up Phase",
            "Growth Phase",
            "Expansion Phase",
            "Maturity/Exit Phase",
        ],
    ),
    (
        FieldName::BusinessPresence,
        &["Home based", "Brick and Mortar", "E-commerce"],
    ),
    (
        FieldName::Race,
        &[
            "American Indian / Alaska Native",
            "Black / African American",
            "Native Hawaiian / Pacific Islander",
            "Asian",
            "White",
        ],
    ),
    (FieldName::Ethnicity, &["Hispanic / Latino", "Other"]),
    (FieldName::Language, &["English", "Spanish"]),
    (FieldName::Veteran, &["Yes", "No"]),
    (FieldName::Disabled, &["Yes", "No"]),
];

/// Glyphs that mark an option as selected.
pub const MARK_GLYPHS: [char; 4] = ['X', '✓', '✗', '⌧'];

/// Anchors that open the narrative notes section, in priority order.
///
/// The flag says whether the anchor text itself belongs to the note.
pub const NOTES_ANCHORS: &[(&str, bool)] = &[
    (r"(?i)\bConsultation\s+Notes[:\s]+", false),
    (r"(?i)\bNotes[:\s]+", false),
    (r"(?i)\b(?:Met|Discussed|Client)\b", true),
];

lazy_static! {
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // A newline followed by a whitespace-only line (or only whitespace to the end).
    pub static ref BLANK_LINE: Regex = Regex::new(r"(?m)\n\s*$").unwrap();
}
