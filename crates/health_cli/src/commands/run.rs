//! Run command - Execute every check and report the results.
//!
//! Progress is printed live from the orchestrator's event stream; the final
//! report is either the text dashboard or a JSON document.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use health_core::{
    HealthConfig, Orchestrator, OverallStatus, RunEvent, RunOutcome, RunSummary, SuiteDefinition,
    SystemInfo, TestKey, TestStatus,
};

use super::OutputFormat;
use crate::render;

#[derive(Args)]
pub struct RunArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Only list this category's results (all checks still run)
    #[arg(long)]
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckResult<'a> {
    name: &'a str,
    #[serde(flatten)]
    status: TestStatus,
}

#[derive(Debug, Serialize)]
struct CategoryResult<'a> {
    name: &'a str,
    checks: Vec<CheckResult<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    system: &'a SystemInfo,
    summary: &'a RunSummary,
    categories: Vec<CategoryResult<'a>>,
}

/// Run the suite. Returns whether every check passed.
pub async fn execute(args: RunArgs, config: &HealthConfig, quiet: bool) -> Result<bool> {
    let orchestrator = Orchestrator::new(config.suite(), config.build_executor()?);
    let suite = orchestrator.suite();

    let selected = match &args.category {
        Some(name) => Some(suite.category_index(name)?),
        None => None,
    };

    let mut events = orchestrator.subscribe();
    let handle = orchestrator
        .spawn()
        .context("Failed to start health check run")?;

    let live = args.format == OutputFormat::Text && !quiet;
    loop {
        match events.recv().await {
            Ok(event) => {
                if live {
                    if let Some(line) = render::event_line(suite, &event) {
                        println!("{}", line);
                    }
                }
                if matches!(event, RunEvent::RunFinished { .. } | RunEvent::RunSuperseded { .. }) {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!("Progress display skipped {} events", skipped)
            }
            Err(RecvError::Closed) => break,
        }
    }

    let summary = match handle.await.context("Health check run panicked")? {
        RunOutcome::Completed(summary) => summary,
        RunOutcome::Superseded { run_id } => bail!("Run {} was interrupted", run_id),
        RunOutcome::AlreadyRunning => bail!("A run is already in progress"),
    };
    info!("Run {} took {} ms", summary.run_id, summary.duration_ms());

    match args.format {
        OutputFormat::Json => {
            let report = JsonReport {
                system: &config.system,
                summary: &summary,
                categories: collect_results(suite, &orchestrator, selected),
            };
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!();
            println!(
                "{}",
                render::overview(&config.system, &orchestrator.session(), &summary.report)
            );
            let store = orchestrator.store();
            let indices: Vec<usize> = match selected {
                Some(index) => vec![index],
                None => (0..suite.categories().len()).collect(),
            };
            for index in indices {
                println!();
                println!("{}", render::category(suite, &store, index));
            }
        }
    }

    Ok(summary.report.overall_status == OverallStatus::AllPassed)
}

fn collect_results<'a>(
    suite: &'a SuiteDefinition,
    orchestrator: &Orchestrator,
    selected: Option<usize>,
) -> Vec<CategoryResult<'a>> {
    let store = orchestrator.store();
    suite
        .categories()
        .iter()
        .enumerate()
        .filter(|(ci, _)| selected.map_or(true, |s| s == *ci))
        .map(|(ci, category)| CategoryResult {
            name: &category.name,
            checks: category
                .tests
                .iter()
                .enumerate()
                .map(|(ti, name)| CheckResult {
                    name,
                    status: store.status(TestKey::new(ci, ti)),
                })
                .collect(),
        })
        .collect()
}
