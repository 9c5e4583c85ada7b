//! Recognized page handed over by the OCR collaborator.

use serde::{Deserialize, Deserializer, Serialize};

/// Text and confidence recognized from one scanned page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedPage {
    /// Full recognized text of the page.
    #[serde(default)]
    pub raw_text: String,

    /// Mean recognition confidence (0 - 100).
    #[serde(default, deserialize_with = "clamped_confidence")]
    pub confidence: f32,

    /// 1-based page number within the source document.
    #[serde(default = "default_page_number")]
    pub page_number: u32,

    /// Whether recognition succeeded.
    #[serde(default)]
    pub success: bool,

    /// Failure reason reported by the OCR collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_page_number() -> u32 {
    1
}

fn clamped_confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Ok(f32::deserialize(deserializer)?.clamp(0.0, 100.0))
}

impl RecognizedPage {
    /// A successfully recognized page.
    pub fn new(page_number: u32, raw_text: impl Into<String>, confidence: f32) -> Self {
        Self {
            raw_text: raw_text.into(),
            confidence: confidence.clamp(0.0, 100.0),
            page_number,
            success: true,
            error: None,
        }
    }

    /// A page the OCR collaborator could not read.
    pub fn failed(page_number: u32, error: impl Into<String>) -> Self {
        Self {
            raw_text: String::new(),
            confidence: 0.0,
            page_number,
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_page() {
        let page: RecognizedPage =
            serde_json::from_str(r#"{"raw_text": "Zip: 60622", "success": true}"#).unwrap();

        assert_eq!(page.page_number, 1);
        assert_eq!(page.confidence, 0.0);
        assert!(page.error.is_none());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let page = RecognizedPage::new(2, "text", 140.0);
        assert_eq!(page.confidence, 100.0);

        let page: RecognizedPage =
            serde_json::from_str(r#"{"raw_text": "x", "confidence": 140, "success": true}"#).unwrap();
        assert_eq!(page.confidence, 100.0);

        let page: RecognizedPage =
            serde_json::from_str(r#"{"raw_text": "x", "confidence": -3.5, "success": true}"#).unwrap();
        assert_eq!(page.confidence, 0.0);
    }
}
