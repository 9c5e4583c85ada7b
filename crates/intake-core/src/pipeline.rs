//! Page pipeline and submission planning.
//!
//! Pages are independent: each one is extracted, mapped and validated on its
//! own, so a document's pages run in parallel and a failing page never
//! affects its siblings. Valid records are then queued in document order for
//! sequential submission with a cool-down between submissions. The caller
//! owns the actual waiting.

use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::form::{FormExtractor, ParsedForm};
use crate::models::fields::ExtractedFields;
use crate::models::page::RecognizedPage;
use crate::models::record::CanonicalRecord;

/// Successful page outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPage {
    pub success: bool,
    #[serde(flatten)]
    pub form: ParsedForm,
}

/// Failed page outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPage {
    pub success: bool,
    pub page_number: u32,
    pub error: String,
    pub parsed_data: ExtractedFields,
}

/// Result of running one page through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageOutcome {
    Parsed(ParsedPage),
    Failed(FailedPage),
}

impl PageOutcome {
    pub fn parsed(form: ParsedForm) -> Self {
        PageOutcome::Parsed(ParsedPage {
            success: true,
            form,
        })
    }

    pub fn failed(page_number: u32, error: impl Into<String>) -> Self {
        PageOutcome::Failed(FailedPage {
            success: false,
            page_number,
            error: error.into(),
            parsed_data: ExtractedFields::new(),
        })
    }

    pub fn page_number(&self) -> u32 {
        match self {
            PageOutcome::Parsed(page) => page.form.page_number,
            PageOutcome::Failed(page) => page.page_number,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PageOutcome::Parsed(_))
    }

    pub fn form(&self) -> Option<&ParsedForm> {
        match self {
            PageOutcome::Parsed(page) => Some(&page.form),
            PageOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PageOutcome::Parsed(_) => None,
            PageOutcome::Failed(page) => Some(&page.error),
        }
    }
}

/// Run one page through extraction, mapping and validation.
pub fn process_page<E: FormExtractor>(extractor: &E, page: &RecognizedPage) -> PageOutcome {
    let span = info_span!("page", page = page.page_number);
    let _enter = span.enter();

    match extractor.extract(page) {
        Ok(form) => PageOutcome::parsed(form),
        Err(e) => {
            warn!("Page {} failed: {}", page.page_number, e);
            PageOutcome::failed(page.page_number, e.to_string())
        }
    }
}

/// Run every page of a document, in parallel, keeping document order.
pub fn process_document<E>(extractor: &E, pages: &[RecognizedPage]) -> Vec<PageOutcome>
where
    E: FormExtractor + Sync,
{
    let outcomes: Vec<PageOutcome> = pages
        .par_iter()
        .map(|page| process_page(extractor, page))
        .collect();

    let parsed = outcomes.iter().filter(|o| o.is_success()).count();
    info!(
        "Processed {} pages: {} parsed, {} failed",
        outcomes.len(),
        parsed,
        outcomes.len() - parsed
    );

    outcomes
}

/// A valid record waiting for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedRecord {
    pub page_number: u32,
    pub record: CanonicalRecord,
}

/// A page that will not be submitted, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub page_number: u32,
    pub business_name: String,
    pub reason: String,
}

/// Ordered submission queue with the cool-down between submissions.
#[derive(Debug, Clone)]
pub struct SubmissionPlan {
    queued: Vec<QueuedRecord>,
    skipped: Vec<SkippedRecord>,
    cooldown: Duration,
}

impl SubmissionPlan {
    /// Queue the validated records of `outcomes`, in the order given.
    pub fn from_outcomes(outcomes: &[PageOutcome], cooldown: Duration) -> Self {
        let mut queued = Vec::new();
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match outcome {
                PageOutcome::Parsed(page) if page.form.validation.is_valid => {
                    queued.push(QueuedRecord {
                        page_number: page.form.page_number,
                        record: page.form.validation.data.clone(),
                    });
                }
                PageOutcome::Parsed(page) => {
                    skipped.push(SkippedRecord {
                        page_number: page.form.page_number,
                        business_name: page.form.validation.data.business_name.clone(),
                        reason: format!(
                            "Missing required fields: {}",
                            page.form.validation.missing_fields.join(", ")
                        ),
                    });
                }
                PageOutcome::Failed(page) => {
                    skipped.push(SkippedRecord {
                        page_number: page.page_number,
                        business_name: String::new(),
                        reason: page.error.clone(),
                    });
                }
            }
        }

        Self {
            queued,
            skipped,
            cooldown,
        }
    }

    pub fn queued(&self) -> &[QueuedRecord] {
        &self.queued
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Delay to observe after submitting the record at `index`; none after the last.
    pub fn delay_after(&self, index: usize) -> Option<Duration> {
        (index + 1 < self.queued.len()).then_some(self.cooldown)
    }
}

/// What happened to one record at a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub page_number: u32,
    pub business_name: String,
    pub success: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionOutcome {
    pub fn succeeded(queued: &QueuedRecord) -> Self {
        Self {
            page_number: queued.page_number,
            business_name: queued.record.business_name.clone(),
            success: true,
            skipped: false,
            error: None,
        }
    }

    pub fn failed(queued: &QueuedRecord, error: impl Into<String>) -> Self {
        Self {
            page_number: queued.page_number,
            business_name: queued.record.business_name.clone(),
            success: false,
            skipped: false,
            error: Some(error.into()),
        }
    }

    pub fn skipped(skipped: &SkippedRecord) -> Self {
        Self {
            page_number: skipped.page_number,
            business_name: skipped.business_name.clone(),
            success: false,
            skipped: true,
            error: Some(skipped.reason.clone()),
        }
    }
}

/// Success counts for one sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub successful: usize,
    pub total: usize,
    pub success_rate: String,
}

impl SubmissionSummary {
    pub fn from_outcomes(outcomes: &[SubmissionOutcome]) -> Self {
        let successful = outcomes.iter().filter(|o| o.success).count();
        let total = outcomes.len();
        let success_rate = if total > 0 {
            format!("{:.1}%", successful as f64 / total as f64 * 100.0)
        } else {
            "0%".to_string()
        };

        Self {
            successful,
            total,
            success_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormParser;
    use pretty_assertions::assert_eq;

    fn pages() -> Vec<RecognizedPage> {
        vec![
            RecognizedPage::new(
                1,
                "Business Name: Acme Co\nContact Name: Ana Lopez\nSession Date: 07/08/2025",
                91.0,
            ),
            RecognizedPage::failed(2, "blank scan"),
            RecognizedPage::new(3, "Contact Name: Luis\nSession Date: 07/09/2025", 77.5),
            RecognizedPage::new(
                4,
                "Business Name: Cafe Colao\nContact Name: Jose Rivera\nSession Date: 7/10/25",
                88.0,
            ),
        ]
    }

    #[test]
    fn test_process_document_keeps_order() {
        let outcomes = process_document(&FormParser::new(), &pages());

        let numbers: Vec<u32> = outcomes.iter().map(PageOutcome::page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
        assert_eq!(outcomes[1].error(), Some("OCR processing failed: blank scan"));
        assert!(outcomes[3].is_success());
    }

    #[test]
    fn test_failed_page_shape() {
        let json = serde_json::to_value(PageOutcome::failed(2, "OCR processing failed")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "page_number": 2,
                "error": "OCR processing failed",
                "parsed_data": {}
            })
        );
    }

    #[test]
    fn test_outcomes_survive_json() {
        let outcomes = process_document(&FormParser::new(), &pages());
        let json = serde_json::to_string(&outcomes).unwrap();
        let back: Vec<PageOutcome> = serde_json::from_str(&json).unwrap();

        assert_eq!(back, outcomes);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["success"], true);
        assert_eq!(value[0]["smartsheet_data"]["business_name"], "Acme Co");
        assert_eq!(value[0]["raw_parsed_data"]["contact_name"], "Ana Lopez");
    }

    #[test]
    fn test_submission_plan() {
        let outcomes = process_document(&FormParser::new(), &pages());
        let plan = SubmissionPlan::from_outcomes(&outcomes, Duration::from_secs(10));

        let queued: Vec<u32> = plan.queued().iter().map(|q| q.page_number).collect();
        assert_eq!(queued, vec![1, 4]);
        assert_eq!(plan.queued()[1].record.consultation_date, "07/10/2025");

        let skipped: Vec<(u32, &str)> = plan
            .skipped()
            .iter()
            .map(|s| (s.page_number, s.reason.as_str()))
            .collect();
        assert_eq!(
            skipped,
            vec![
                (2, "OCR processing failed: blank scan"),
                (3, "Missing required fields: business_name"),
            ]
        );

        assert_eq!(plan.delay_after(0), Some(Duration::from_secs(10)));
        assert_eq!(plan.delay_after(1), None);
    }

    #[test]
    fn test_summary() {
        let outcomes = process_document(&FormParser::new(), &pages());
        let plan = SubmissionPlan::from_outcomes(&outcomes, Duration::ZERO);

        let mut results: Vec<SubmissionOutcome> = plan
            .queued()
            .iter()
            .map(SubmissionOutcome::succeeded)
            .collect();
        results.push(SubmissionOutcome::skipped(&plan.skipped()[0]));

        let summary = SubmissionSummary::from_outcomes(&results);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.success_rate, "66.7%");

        assert_eq!(SubmissionSummary::from_outcomes(&[]).success_rate, "0%");
    }
}
