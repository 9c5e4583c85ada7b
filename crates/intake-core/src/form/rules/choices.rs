//! Checkbox and radio-button detection in recognized text.
//!
//! An option counts as selected when a mark glyph sits directly before or
//! after its text, separated only by whitespace. A stray glyph next to an
//! option label is misattributed; OCR text alone cannot tell the difference.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::FieldExtractor;
use super::patterns::{CHOICE_OPTIONS, MARK_GLYPHS};
use crate::error::ExtractionError;
use crate::models::fields::{ExtractedFields, FieldName};

lazy_static! {
    static ref BUILTIN_GROUPS: ChoiceExtractor = ChoiceExtractor::from_table(CHOICE_OPTIONS).unwrap();
}

/// A registered option with its compiled mark matcher.
#[derive(Debug, Clone)]
struct ChoiceOption {
    label: String,
    marked: Regex,
}

impl ChoiceOption {
    fn compile(group: FieldName, label: &str) -> Result<Self, ExtractionError> {
        let glyphs: String = MARK_GLYPHS.iter().collect();
        let option = regex::escape(label);
        let pattern = format!("(?i)[{glyphs}]\\s*{option}|{option}\\s*[{glyphs}]");

        let marked = Regex::new(&pattern).map_err(|e| ExtractionError::InvalidPattern {
            field: group.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            label: label.to_string(),
            marked,
        })
    }
}

/// Extractor for choice groups with fixed, ordered option lists.
#[derive(Debug, Clone, Default)]
pub struct ChoiceExtractor {
    groups: BTreeMap<FieldName, Vec<ChoiceOption>>,
}

impl ChoiceExtractor {
    /// Create an extractor with the built-in consultation form groups.
    pub fn new() -> Self {
        BUILTIN_GROUPS.clone()
    }

    /// Register groups from a table of (group, options).
    pub fn from_table(table: &[(FieldName, &[&str])]) -> Result<Self, ExtractionError> {
        table
            .iter()
            .try_fold(Self::default(), |extractor, (group, options)| {
                extractor.with_group(*group, options)
            })
    }

    /// Register (or replace) a group's options.
    pub fn with_group(mut self, group: FieldName, options: &[&str]) -> Result<Self, ExtractionError> {
        if !group.is_choice_group() {
            return Err(ExtractionError::UnknownChoiceGroup(group.to_string()));
        }

        let compiled = options
            .iter()
            .map(|label| ChoiceOption::compile(group, label))
            .collect::<Result<Vec<_>, _>>()?;

        self.groups.insert(group, compiled);
        Ok(self)
    }

    /// Registered options of a group, in registration order.
    pub fn options(&self, group: FieldName) -> Vec<&str> {
        self.groups
            .get(&group)
            .map(|options| options.iter().map(|o| o.label.as_str()).collect())
            .unwrap_or_default()
    }

    /// Marked options of a group, in registration order.
    ///
    /// Unknown groups and unmarked text both yield an empty selection.
    pub fn selections(&self, text: &str, group: FieldName) -> Vec<String> {
        let Some(options) = self.groups.get(&group) else {
            debug!(group = %group, "no options registered for choice group");
            return Vec::new();
        };

        options
            .iter()
            .filter(|option| option.marked.is_match(text))
            .map(|option| option.label.clone())
            .collect()
    }
}

impl FieldExtractor for ChoiceExtractor {
    type Output = Vec<String>;

    fn extract(&self, text: &str, field: FieldName) -> Option<Self::Output> {
        let selections = self.selections(text, field);
        (!selections.is_empty()).then_some(selections)
    }

    fn extract_all(&self, text: &str, fields: &mut ExtractedFields) {
        for group in self.groups.keys() {
            fields.insert_choices(*group, self.selections(text, *group));
        }
    }
}
