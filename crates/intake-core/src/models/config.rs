//! Configuration structures for the intake pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the intake pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Static program and agency values stamped on every record.
    pub program: ProgramConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Submission pacing.
    pub submission: SubmissionConfig,

    /// CRM synchronisation.
    pub crm: CrmConfig,
}

/// Program and agency values that never come from the scanned form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    /// Delegate agency running the program.
    pub delegate_agency: String,

    /// Vendor identifier assigned to the agency.
    pub vendor_id: String,

    /// Program name.
    pub program: String,

    /// Account the submissions are made under.
    pub submitted_by: String,

    /// Month the consultations are reported for.
    pub reporting_month: String,

    /// Referral source reported for every client.
    pub referral_source: String,

    /// City used when the form has none.
    pub default_city: String,

    /// State for every address.
    pub state: String,

    /// Service areas reported for every consultation.
    pub service_areas: Vec<String>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            delegate_agency: "Puerto Rican Cultural Center (PRCC)".to_string(),
            vendor_id: "1055031".to_string(),
            program: "Place-based Business Specialist".to_string(),
            submitted_by: "wesleyo@prcc-chgo.org".to_string(),
            reporting_month: "August".to_string(),
            referral_source: "Economic Development Nonprofit".to_string(),
            default_city: "Chicago".to_string(),
            state: "IL".to_string(),
            service_areas: vec!["Business Planning & Strategy".to_string()],
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Rewrite `|` to `I` in text fields.
    pub correct_pipe_glyph: bool,

    /// Rewrite `0` to `O` in text fields. Off by default: it corrupts any
    /// digits that end up in a text field.
    pub correct_zero_glyph: bool,

    /// Notes shorter than this (in characters) are discarded.
    pub min_notes_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            correct_pipe_glyph: true,
            correct_zero_glyph: false,
            min_notes_length: 20,
        }
    }
}

/// Cool-down between consecutive submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Seconds between CRM requests.
    pub crm_cooldown_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            crm_cooldown_secs: 1,
        }
    }
}

/// How records reach the CRM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrmTransport {
    /// POST the whole payload to a workflow webhook.
    #[default]
    Webhook,
    /// Create company, contact and activity through the CRM REST API.
    Direct,
}

/// CRM synchronisation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    /// Sync records to the CRM at all.
    pub enabled: bool,

    /// Transport used when syncing.
    pub transport: CrmTransport,

    /// Workflow webhook endpoint.
    pub webhook_url: Option<String>,

    /// Base URL of the CRM REST API.
    pub api_url: Option<String>,

    /// Bearer token for the CRM REST API.
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            transport: CrmTransport::Webhook,
            webhook_url: None,
            api_url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl IntakeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
