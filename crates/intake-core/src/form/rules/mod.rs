//! Rule-based extractors for consultation forms.

pub mod choices;
pub mod dates;
pub mod fields;
pub mod notes;
pub mod patterns;
pub mod remap;

pub use choices::ChoiceExtractor;
pub use dates::{normalize_date, parse_date};
pub use fields::{FieldRules, ScalarExtractor};
pub use notes::NotesExtractor;

use crate::models::config::ExtractionConfig;
use crate::models::fields::{ExtractedFields, FieldName};

use patterns::WHITESPACE_RUN;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract a single field from text. `None` means the field is absent.
    fn extract(&self, text: &str, field: FieldName) -> Option<Self::Output>;

    /// Extract every field this extractor handles into `fields`.
    fn extract_all(&self, text: &str, fields: &mut ExtractedFields);
}

/// OCR misread corrections applied while cleaning matched text.
///
/// Corrections are letter substitutions and are never applied to fields
/// whose values carry digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrCorrections {
    /// `|` read in place of `I`.
    pub pipe_to_i: bool,
    /// `0` read in place of `O`.
    pub zero_to_o: bool,
}

impl Default for OcrCorrections {
    fn default() -> Self {
        Self {
            pipe_to_i: true,
            zero_to_o: false,
        }
    }
}

impl From<&ExtractionConfig> for OcrCorrections {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            pipe_to_i: config.correct_pipe_glyph,
            zero_to_o: config.correct_zero_glyph,
        }
    }
}

impl OcrCorrections {
    /// Collapse whitespace runs, trim, and apply letter corrections unless
    /// the text belongs to a field that carries digits.
    pub fn clean(&self, text: &str, keep_digits: bool) -> String {
        let mut cleaned = WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned();

        if !keep_digits {
            if self.pipe_to_i {
                cleaned = cleaned.replace('|', "I");
            }
            if self.zero_to_o {
                cleaned = cleaned.replace('0', "O");
            }
        }

        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_whitespace() {
        let corrections = OcrCorrections::default();
        assert_eq!(corrections.clean("  Plena \t  Mercancia\n ", false), "Plena Mercancia");
        assert_eq!(corrections.clean("", false), "");
    }

    #[test]
    fn test_pipe_correction_skips_digit_fields() {
        let corrections = OcrCorrections::default();
        assert_eq!(corrections.clean("|nk & Co", false), "Ink & Co");
        assert_eq!(corrections.clean("773|555", true), "773|555");
    }

    #[test]
    fn test_zero_correction_is_opt_in() {
        let corrections = OcrCorrections::default();
        assert_eq!(corrections.clean("B0B", false), "B0B");

        let corrections = OcrCorrections {
            zero_to_o: true,
            ..OcrCorrections::default()
        };
        assert_eq!(corrections.clean("B0B", false), "BOB");
        assert_eq!(corrections.clean("07/08/2025", true), "07/08/2025");
    }
}
