//! Sync command - submit validated records to the CRM.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use intake_core::models::crm::CrmPayload;
use intake_core::pipeline::{PageOutcome, SubmissionOutcome, SubmissionPlan, SubmissionSummary};

use super::process::load_config;
use crate::sinks::{Sink, SinkKind};

/// Report written by `--results`.
#[derive(Serialize)]
struct SyncReport<'a> {
    sink: &'a str,
    summary: &'a SubmissionSummary,
    results: &'a [SubmissionOutcome],
}

/// Arguments for the sync command.
#[derive(Args)]
pub struct SyncArgs {
    /// Parsed outcomes file written by `process` or `batch` (JSON)
    #[arg(required_unless_present = "check")]
    input: Option<PathBuf>,

    /// Destination (default: the configured CRM transport)
    #[arg(short, long, value_enum)]
    sink: Option<SinkKind>,

    /// File the dry-run sink appends payloads to
    #[arg(long)]
    dry_run_output: Option<PathBuf>,

    /// Seconds to wait between submissions (default: crm cool-down from config)
    #[arg(long)]
    cooldown: Option<u64>,

    /// Write per-record results and the summary to this file
    #[arg(short, long)]
    results: Option<PathBuf>,

    /// Only test the connection to the destination
    #[arg(long)]
    check: bool,
}

pub async fn run(args: SyncArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let kind = args.sink.unwrap_or_else(|| config.crm.transport.into());
    if kind != SinkKind::DryRun && !config.crm.enabled {
        anyhow::bail!("CRM sync is disabled in configuration (crm.enabled = false)");
    }

    let sink = Sink::from_config(kind, &config.crm, args.dry_run_output.clone())?;

    if args.check {
        let status = sink.check().await?;
        println!("{} {}: {}", style("✓").green(), sink.name(), status);
        return Ok(());
    }

    let Some(input) = args.input.as_ref() else {
        anyhow::bail!("No outcomes file given");
    };
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let outcomes: Vec<PageOutcome> = serde_json::from_str(&fs::read_to_string(input)?)?;

    let cooldown = Duration::from_secs(args.cooldown.unwrap_or(config.submission.crm_cooldown_secs));
    let plan = SubmissionPlan::from_outcomes(&outcomes, cooldown);

    println!(
        "{} {} records queued for {}, {} skipped",
        style("ℹ").blue(),
        plan.len(),
        sink.name(),
        plan.skipped().len()
    );

    let pb = ProgressBar::new(plan.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(outcomes.len());

    for (index, queued) in plan.queued().iter().enumerate() {
        pb.set_message(queued.record.business_name.clone());

        let payload = CrmPayload::from_record(&queued.record, chrono::Local::now().naive_local());
        match sink.submit(&payload).await {
            Ok(()) => {
                info!("Page {} submitted to {}", queued.page_number, sink.name());
                results.push(SubmissionOutcome::succeeded(queued));
            }
            Err(e) => {
                warn!("Page {} failed: {}", queued.page_number, e);
                results.push(SubmissionOutcome::failed(queued, e.to_string()));
            }
        }
        pb.inc(1);

        if let Some(delay) = plan.delay_after(index) {
            tokio::time::sleep(delay).await;
        }
    }

    pb.finish_and_clear();

    results.extend(plan.skipped().iter().map(SubmissionOutcome::skipped));
    let summary = SubmissionSummary::from_outcomes(&results);

    if let Some(results_path) = &args.results {
        let report = SyncReport {
            sink: sink.name(),
            summary: &summary,
            results: &results,
        };
        fs::write(results_path, serde_json::to_string_pretty(&report)?)?;
    }

    println!(
        "{} {}: {}/{} records succeeded ({})",
        style("✓").green(),
        sink.name(),
        summary.successful,
        summary.total,
        summary.success_rate
    );

    let failures: Vec<_> = results.iter().filter(|r| !r.success).collect();
    if !failures.is_empty() {
        println!();
        println!("{}", style("Not submitted:").yellow());
        for result in failures {
            println!(
                "  - page {} {}: {}",
                result.page_number,
                result.business_name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}
