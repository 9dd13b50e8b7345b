//! Text rendering for the terminal dashboard.

use std::fmt::Write;

use chrono::Local;

use health_core::{
    AggregateReport, OverallStatus, RunEvent, RunSession, RunStateStore, SuiteDefinition,
    SystemInfo, TestStatus,
};

const BAR_WIDTH: usize = 30;

pub fn glyph(status: &TestStatus) -> &'static str {
    match status {
        TestStatus::Pass => "✓",
        TestStatus::Fail => "✗",
        TestStatus::Error { .. } => "!",
        TestStatus::Running => "…",
        TestStatus::NotRun => "-",
    }
}

fn overall_glyph(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::AllPassed => "✅",
        OverallStatus::IssuesFound => "❌",
        OverallStatus::Running => "⏳",
        OverallStatus::NotRun => "○",
    }
}

/// `[#########---------]  50%`
pub fn progress_bar(pct: u8, width: usize) -> String {
    let pct = pct.min(100) as usize;
    let filled = (pct * width + 50) / 100;
    format!("[{}{}] {:>3}%", "#".repeat(filled), "-".repeat(width - filled), pct)
}

/// The overview panel: verdict, system info, last run and progress.
pub fn overview(system: &SystemInfo, session: &RunSession, report: &AggregateReport) -> String {
    let last_run = session
        .last_completed_at
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "—".to_string());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Office Health Check  {} {}",
        overall_glyph(report.overall_status),
        report.overall_status
    );
    let _ = writeln!(out, "  macOS:            {}", system.os_version);
    let _ = writeln!(out, "  Microsoft Office: {}", system.office_version);
    let _ = writeln!(out, "  Last run:         {}", last_run);
    let bar = progress_bar(session.progress_pct, BAR_WIDTH);
    let _ = writeln!(out, "  Progress:         {}", bar);
    let _ = write!(
        out,
        "  Results:          {} passed, {} failed of {} ({}% success)",
        report.pass_count, report.fail_count, report.total_count, report.success_pct
    );
    if report.error_count > 0 {
        let _ = write!(out, ", {} could not run", report.error_count);
    }
    out
}

/// One category's checks with their current status.
pub fn category(suite: &SuiteDefinition, store: &RunStateStore, index: usize) -> String {
    let Some(category) = suite.categories().get(index) else {
        return String::new();
    };
    let width = category.tests.iter().map(|t| t.chars().count()).max().unwrap_or(0);

    let mut out = format!("{} Tests", category.name);
    for (ti, name) in category.tests.iter().enumerate() {
        let status = store.status(health_core::TestKey::new(index, ti));
        let _ = write!(out, "\n  {:<width$}  {} {}", name, glyph(&status), status, width = width);
    }
    out
}

/// A single live progress line for an event, if the event warrants one.
pub fn event_line(suite: &SuiteDefinition, event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::RunStarted { total, .. } => {
            Some(format!("Running {} checks sequentially…", total))
        }
        RunEvent::TestFinished {
            key,
            status,
            progress_pct,
            ..
        } => {
            let id = suite.resolve(*key)?;
            Some(format!("{} {:<40} {:>3}%", glyph(status), id.to_string(), progress_pct))
        }
        RunEvent::RunSuperseded { .. } => Some("Run abandoned after reset".to_string()),
        RunEvent::Reset => Some("Results and progress cleared".to_string()),
        RunEvent::TestStarted { .. } | RunEvent::RunFinished { .. } => None,
    }
}
