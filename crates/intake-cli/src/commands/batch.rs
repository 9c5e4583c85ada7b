//! Batch processing command for multiple OCR result files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use intake_core::pipeline::{PageOutcome, process_document};
use intake_core::FormParser;

use super::process::{OutputFormat, format_outcomes, load_config, load_pages};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcomes: Option<Vec<PageOutcome>>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn count(&self, pred: impl Fn(&PageOutcome) -> bool) -> usize {
        self.outcomes
            .as_ref()
            .map(|o| o.iter().filter(|&p| pred(p)).count())
            .unwrap_or(0)
    }
}

fn is_valid(outcome: &PageOutcome) -> bool {
    outcome.form().is_some_and(|f| f.validation.is_valid)
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "json" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = FormParser::from_config(&config);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = load_pages(&path).map(|pages| process_document(&parser, &pages));
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(outcomes) => {
                results.push(ProcessResult {
                    path,
                    outcomes: Some(outcomes),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        outcomes: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(outcomes) = &result.outcomes {
                let output_path = output_path(output_dir, &result.path, args.format);
                fs::write(&output_path, format_outcomes(outcomes, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let pages: usize = results.iter().map(|r| r.count(|_| true)).sum();
    let valid: usize = results.iter().map(|r| r.count(is_valid)).sum();

    println!();
    println!(
        "{} Processed {} files ({} pages) in {:?}",
        style("✓").green(),
        results.len(),
        pages,
        start.elapsed()
    );
    println!(
        "   {} valid records, {} pages skipped, {} files failed",
        style(valid).green(),
        style(pages - valid).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("intake");

    // Keep JSON inputs and outputs apart when both live in the same directory.
    output_dir.join(format!("{}.parsed.{}", stem, format.extension()))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "pages",
        "valid_records",
        "failed_pages",
        "business_names",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.outcomes {
            Some(outcomes) => {
                let names: Vec<&str> = outcomes
                    .iter()
                    .filter_map(PageOutcome::form)
                    .map(|f| f.validation.data.business_name.as_str())
                    .filter(|n| !n.is_empty())
                    .collect();

                wtr.write_record([
                    filename,
                    "success",
                    &outcomes.len().to_string(),
                    &result.count(is_valid).to_string(),
                    &result.count(|o| !o.is_success()).to_string(),
                    &names.join("; "),
                    &result.processing_time_ms.to_string(),
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    &result.processing_time_ms.to_string(),
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
