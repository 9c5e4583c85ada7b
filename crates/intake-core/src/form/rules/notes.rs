//! Free-text consultation notes.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::{BLANK_LINE, NOTES_ANCHORS};
use super::{FieldExtractor, OcrCorrections};
use crate::models::fields::{ExtractedFields, FieldName};

lazy_static! {
    static ref ANCHORS: Vec<NotesAnchor> = NOTES_ANCHORS
        .iter()
        .map(|(pattern, inclusive)| NotesAnchor {
            regex: Regex::new(pattern).unwrap(),
            inclusive: *inclusive,
        })
        .collect();
}

#[derive(Debug, Clone)]
struct NotesAnchor {
    regex: Regex,
    inclusive: bool,
}

/// Extractor for the narrative notes section.
///
/// The section runs from an anchor to the next blank line or the end of the
/// text. Anchors are tried in order and the first one yielding a note longer
/// than the minimum length wins.
#[derive(Debug, Clone)]
pub struct NotesExtractor {
    min_length: usize,
    corrections: OcrCorrections,
}

impl NotesExtractor {
    pub fn new() -> Self {
        Self {
            min_length: 20,
            corrections: OcrCorrections::default(),
        }
    }

    /// Set the length (in characters) a note must exceed to be accepted.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set OCR corrections applied to the note text.
    pub fn with_corrections(mut self, corrections: OcrCorrections) -> Self {
        self.corrections = corrections;
        self
    }

    /// Extract the notes section, empty when none qualifies.
    pub fn notes(&self, text: &str) -> String {
        for anchor in ANCHORS.iter() {
            let Some(m) = anchor.regex.find(text) else {
                continue;
            };

            let start = if anchor.inclusive { m.start() } else { m.end() };
            let section = &text[start..];
            let end = BLANK_LINE.find(section).map_or(section.len(), |b| b.start());

            let candidate = section[..end].trim();
            if candidate.chars().count() > self.min_length {
                return self.corrections.clean(candidate, false);
            }
        }

        String::new()
    }
}

impl Default for NotesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NotesExtractor {
    type Output = String;

    fn extract(&self, text: &str, field: FieldName) -> Option<Self::Output> {
        if field != FieldName::ConsultationNotes {
            return None;
        }
        let notes = self.notes(text);
        (!notes.is_empty()).then_some(notes)
    }

    fn extract_all(&self, text: &str, fields: &mut ExtractedFields) {
        fields.insert_text(FieldName::ConsultationNotes, self.notes(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_FOOTER: &str = "Advisor: Wesley O.
Contact Time: 2

Consultation Notes:
Met with client to discuss upcoming events and their plans. Discussed
some marketing ideas.

Signature: ________";

    #[test]
    fn test_notes_section_stops_at_blank_line() {
        let extractor = NotesExtractor::new();
        assert_eq!(
            extractor.notes(FORM_FOOTER),
            "Met with client to discuss upcoming events and their plans. Discussed some marketing ideas."
        );
    }

    #[test]
    fn test_notes_runs_to_end_of_text() {
        let extractor = NotesExtractor::new();
        let text = "Notes: Helped the owner register a trade name with the county";
        assert_eq!(
            extractor.notes(text),
            "Helped the owner register a trade name with the county"
        );
    }

    #[test]
    fn test_short_note_falls_through_to_narrative() {
        let extractor = NotesExtractor::new();
        let text = "Notes: n/a\n\nDiscussed a storefront lease renewal with the landlord";
        assert_eq!(
            extractor.notes(text),
            "Discussed a storefront lease renewal with the landlord"
        );
    }

    #[test]
    fn test_no_notes() {
        let extractor = NotesExtractor::new();
        assert_eq!(extractor.notes("Zip: 60622"), "");
        assert_eq!(extractor.notes("Notes: short"), "");
        assert_eq!(extractor.extract("Notes: short", FieldName::ConsultationNotes), None);
    }

    #[test]
    fn test_min_length_is_strict() {
        let text = "Notes: exactly twenty chars";
        let twenty = "exactly twenty chars";
        assert_eq!(twenty.len(), 20);

        assert_eq!(NotesExtractor::new().notes(text), "");
        assert_eq!(NotesExtractor::new().with_min_length(19).notes(text), twenty);
    }
}
