//! Process command - parse the recognized pages of a single scanned document.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use intake_core::models::config::IntakeConfig;
use intake_core::models::page::RecognizedPage;
use intake_core::models::record::CanonicalRecord;
use intake_core::pipeline::{PageOutcome, process_document};
use intake_core::FormParser;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (OCR result as JSON, or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show OCR confidence per page
    #[arg(long)]
    show_confidence: bool,

    /// Report validation issues on stderr
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Load configuration from an explicit path, or fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<IntakeConfig> {
    Ok(match config_path {
        Some(path) => IntakeConfig::from_file(Path::new(path))?,
        None => IntakeConfig::default(),
    })
}

/// Read the recognized pages of one document.
///
/// JSON files hold one page or an array of pages; `.txt` files are a single
/// fully-confident page.
pub fn load_pages(path: &Path) -> anyhow::Result<Vec<RecognizedPage>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let content = fs::read_to_string(path)?;

    match extension.as_str() {
        "json" => {
            let value: serde_json::Value = serde_json::from_str(&content)?;
            let pages = if value.is_array() {
                serde_json::from_value(value)?
            } else {
                vec![serde_json::from_value(value)?]
            };
            Ok(pages)
        }
        "txt" => Ok(vec![RecognizedPage::new(1, content, 100.0)]),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );

    pb.set_message("Loading pages...");
    let pages = load_pages(&args.input)?;
    debug!("Loaded {} pages", pages.len());

    pb.set_message(format!("Parsing {} pages...", pages.len()));
    let parser = FormParser::from_config(&config);
    let outcomes = process_document(&parser, &pages);

    pb.finish_and_clear();

    if args.validate {
        report_issues(&outcomes);
    }

    let output = format_outcomes(&outcomes, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        for outcome in &outcomes {
            if let Some(form) = outcome.form() {
                println!(
                    "{} Page {} OCR confidence: {:.1}%",
                    style("ℹ").blue(),
                    form.page_number,
                    form.confidence
                );
            }
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn report_issues(outcomes: &[PageOutcome]) {
    for outcome in outcomes {
        match outcome.form() {
            Some(form) => {
                let validation = &form.validation;
                if !validation.is_valid {
                    eprintln!(
                        "{} Page {}: missing {}",
                        style("Validation issues:").yellow(),
                        form.page_number,
                        validation.missing_fields.join(", ")
                    );
                }
                for warning in &validation.warnings {
                    eprintln!("  - Page {}: {}", form.page_number, warning);
                }
            }
            None => {
                eprintln!(
                    "{} Page {}: {}",
                    style("Failed:").red(),
                    outcome.page_number(),
                    outcome.error().unwrap_or("unknown error")
                );
            }
        }
    }
}

pub fn format_outcomes(outcomes: &[PageOutcome], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcomes)?),
        OutputFormat::Csv => format_csv(outcomes),
        OutputFormat::Text => Ok(format_text(outcomes)),
    }
}

fn format_csv(outcomes: &[PageOutcome]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["page_number", "success", "is_valid", "missing_fields", "error"];
    header.extend(CanonicalRecord::ATTRIBUTES);
    wtr.write_record(&header)?;

    for outcome in outcomes {
        let page = outcome.page_number().to_string();
        match outcome.form() {
            Some(form) => {
                let mut row = vec![
                    page,
                    "true".to_string(),
                    form.validation.is_valid.to_string(),
                    form.validation.missing_fields.join("; "),
                    String::new(),
                ];
                row.extend(form.validation.data.values());
                wtr.write_record(&row)?;
            }
            None => {
                let mut row = vec![
                    page,
                    "false".to_string(),
                    "false".to_string(),
                    String::new(),
                    outcome.error().unwrap_or_default().to_string(),
                ];
                row.extend(std::iter::repeat_n(String::new(), CanonicalRecord::ATTRIBUTES.len()));
                wtr.write_record(&row)?;
            }
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(outcomes: &[PageOutcome]) -> String {
    let mut output = String::new();

    for outcome in outcomes {
        let Some(form) = outcome.form() else {
            output.push_str(&format!(
                "Page {}: FAILED ({})\n\n",
                outcome.page_number(),
                outcome.error().unwrap_or("unknown error")
            ));
            continue;
        };

        let record = &form.validation.data;
        let status = if form.validation.is_valid { "valid" } else { "invalid" };

        output.push_str(&format!("Page {} ({})\n", form.page_number, status));
        output.push_str(&format!("  Business: {}\n", record.business_name));
        output.push_str(&format!("  Owner:    {}\n", record.owner_full_name()));
        output.push_str(&format!(
            "  Address:  {}, {}, {} {}\n",
            record.business_street_address, record.city, record.state, record.zip_code
        ));
        output.push_str(&format!(
            "  Session:  {} ({} h, {})\n",
            record.consultation_date, record.consultation_length, record.consultation_language
        ));
        output.push_str(&format!(
            "  Business: {} / {} / {}\n",
            record.business_stage, record.business_structure, record.business_presence
        ));
        if !record.business_summary.is_empty() {
            output.push_str(&format!("  Notes:    {}\n", record.business_summary));
        }
        if !form.validation.is_valid {
            output.push_str(&format!(
                "  Missing:  {}\n",
                form.validation.missing_fields.join(", ")
            ));
        }
        output.push('\n');
    }

    output
}
