//! Scalar field extraction with ordered pattern rules.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::patterns::FIELD_PATTERNS;
use super::{FieldExtractor, OcrCorrections};
use crate::error::ExtractionError;
use crate::models::fields::{ExtractedFields, FieldName};

lazy_static! {
    static ref BUILTIN_RULES: FieldRules = FieldRules::from_table(FIELD_PATTERNS).unwrap();
}

/// Ordered, compiled patterns per field name.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    rules: BTreeMap<FieldName, Vec<Regex>>,
}

impl FieldRules {
    /// The built-in consultation form rules.
    pub fn builtin() -> Self {
        BUILTIN_RULES.clone()
    }

    /// Compile a rule table. Patterns are matched case-insensitive and multi-line.
    pub fn from_table(table: &[(FieldName, &[&str])]) -> Result<Self, ExtractionError> {
        let mut rules = Self::default();
        for (field, patterns) in table {
            for pattern in *patterns {
                rules.push(*field, pattern)?;
            }
        }
        Ok(rules)
    }

    /// Append a lower-priority pattern for a field.
    pub fn with_rule(mut self, field: FieldName, pattern: &str) -> Result<Self, ExtractionError> {
        self.push(field, pattern)?;
        Ok(self)
    }

    fn push(&mut self, field: FieldName, pattern: &str) -> Result<(), ExtractionError> {
        let regex = Regex::new(&format!("(?im){}", pattern)).map_err(|e| {
            ExtractionError::InvalidPattern {
                field: field.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.rules.entry(field).or_default().push(regex);
        Ok(())
    }

    /// Patterns for a field in priority order.
    pub fn patterns(&self, field: FieldName) -> &[Regex] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fields that have at least one rule, in field order.
    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.rules.keys().copied()
    }
}

/// First-match-wins extractor for scalar fields.
#[derive(Debug, Clone)]
pub struct ScalarExtractor {
    rules: FieldRules,
    corrections: OcrCorrections,
}

impl ScalarExtractor {
    /// Create an extractor over the built-in rules.
    pub fn new() -> Self {
        Self {
            rules: FieldRules::builtin(),
            corrections: OcrCorrections::default(),
        }
    }

    /// Replace the rule table.
    pub fn with_rules(mut self, rules: FieldRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set OCR corrections for text fields.
    pub fn with_corrections(mut self, corrections: OcrCorrections) -> Self {
        self.corrections = corrections;
        self
    }
}

impl Default for ScalarExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ScalarExtractor {
    type Output = String;

    fn extract(&self, text: &str, field: FieldName) -> Option<Self::Output> {
        for (priority, pattern) in self.rules.patterns(field).iter().enumerate() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };

            // A rule without a capture group locates a keyword option.
            let matched = caps.get(1).or_else(|| caps.get(0))?;
            trace!(field = %field, priority, "pattern matched");

            return Some(self.corrections.clean(matched.as_str(), field.carries_digits()));
        }

        None
    }

    fn extract_all(&self, text: &str, fields: &mut ExtractedFields) {
        for field in self.rules.fields() {
            if let Some(value) = self.extract(text, field) {
                fields.insert_text(field, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_field() {
        let extractor = ScalarExtractor::new();
        let text = "Business Name: Acme Co\nZip: 60622";

        assert_eq!(
            extractor.extract(text, FieldName::BusinessName),
            Some("Acme Co".to_string())
        );
        assert_eq!(extractor.extract(text, FieldName::Zip), Some("60622".to_string()));
    }

    #[test]
    fn test_no_match_is_absent() {
        let extractor = ScalarExtractor::new();
        assert_eq!(extractor.extract("nothing useful here", FieldName::BusinessName), None);
        assert_eq!(extractor.extract("", FieldName::Zip), None);

        let mut fields = ExtractedFields::new();
        extractor.extract_all("", &mut fields);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_first_pattern_wins() {
        let extractor = ScalarExtractor::new();

        // The labelled rule beats the bare-date fallback even though the
        // fallback would match earlier in the text.
        let text = "Printed 01/01/2024\nSession Date: 07/08/2025";
        assert_eq!(
            extractor.extract(text, FieldName::SessionDate),
            Some("07/08/2025".to_string())
        );

        assert_eq!(
            extractor.extract("Printed 01/01/2024", FieldName::SessionDate),
            Some("01/01/2024".to_string())
        );
    }

    #[test]
    fn test_zip_code_fallback() {
        let extractor = ScalarExtractor::new();
        assert_eq!(
            extractor.extract("Zip Code: 60647", FieldName::Zip),
            Some("60647".to_string())
        );
    }

    #[test]
    fn test_keyword_rule_returns_whole_match() {
        let extractor = ScalarExtractor::new();
        assert_eq!(
            extractor.extract("We registered as an LLC last year", FieldName::BusinessStructure),
            Some("LLC".to_string())
        );
    }

    #[test]
    fn test_city_does_not_match_inside_ethnicity() {
        let extractor = ScalarExtractor::new();
        assert_eq!(extractor.extract("Ethnicity: X Other", FieldName::City), None);
    }

    #[test]
    fn test_case_insensitive_and_cleaned() {
        let extractor = ScalarExtractor::new();
        assert_eq!(
            extractor.extract("CONTACT NAME:   Daphne    R|vera", FieldName::ContactName),
            Some("Daphne RIvera".to_string())
        );
    }

    #[test]
    fn test_address_and_email_keep_their_digits() {
        let extractor = ScalarExtractor::new();
        assert_eq!(
            extractor.extract("Address: 1|23 W Division St", FieldName::Address),
            Some("1|23 W Division St".to_string())
        );
        assert_eq!(
            extractor.extract("Email: ana|2024@example.com", FieldName::Email),
            Some("ana|2024@example.com".to_string())
        );

        let extractor = ScalarExtractor::new().with_corrections(OcrCorrections {
            zero_to_o: true,
            ..OcrCorrections::default()
        });
        assert_eq!(
            extractor.extract("Address: 1040 N Western Ave", FieldName::Address),
            Some("1040 N Western Ave".to_string())
        );
        assert_eq!(
            extractor.extract("Email: ana2020@x.com", FieldName::Email),
            Some("ana2020@x.com".to_string())
        );
    }

    #[test]
    fn test_years_in_business_fallback_takes_first_number() {
        let extractor = ScalarExtractor::new();
        let minimal = "Business Name: Acme Co\nZip: 60622\nSession Date: 7/8/25";
        assert_eq!(
            extractor.extract(minimal, FieldName::YearsInBusiness),
            Some("60622".to_string())
        );

        let labelled = "Zip: 60622\nYears in business: 3-5";
        assert_eq!(
            extractor.extract(labelled, FieldName::YearsInBusiness),
            Some("3-5".to_string())
        );
    }

    #[test]
    fn test_invalid_custom_rule() {
        let result = FieldRules::builtin().with_rule(FieldName::Dba, r"Trade\s+Name[:\s]+(");
        assert!(matches!(
            result,
            Err(ExtractionError::InvalidPattern { ref field, .. }) if field == "dba"
        ));
    }

    #[test]
    fn test_custom_rule_is_lowest_priority() {
        let rules = FieldRules::builtin()
            .with_rule(FieldName::Dba, r"Trade\s+Name[:\s]+([^\n\r]+)")
            .unwrap();
        let extractor = ScalarExtractor::new().with_rules(rules);

        assert_eq!(
            extractor.extract("Trade Name: Cafe Colao", FieldName::Dba),
            Some("Cafe Colao".to_string())
        );
    }
}
