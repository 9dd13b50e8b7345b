//! Derived run summary.
//!
//! Nothing here is stored: every figure is recomputed from the suite, the
//! store and the session whenever it is asked for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::{percent, RunSession};
use crate::status::TestStatus;
use crate::store::RunStateStore;
use crate::suite::SuiteDefinition;

/// Overall verdict across the current store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    NotRun,
    Running,
    IssuesFound,
    AllPassed,
}

impl OverallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotRun => "Not Run",
            Self::Running => "Running",
            Self::IssuesFound => "Issues Found",
            Self::AllPassed => "All Passed",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts and verdict for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub total_count: usize,
    pub pass_count: usize,
    /// Includes errored checks.
    pub fail_count: usize,
    pub error_count: usize,
    pub completed_count: usize,
    pub success_pct: u8,
    pub is_complete: bool,
    pub overall_status: OverallStatus,
}

impl AggregateReport {
    pub fn compute(suite: &SuiteDefinition, store: &RunStateStore, session: &RunSession) -> Self {
        let total_count = suite.total_count();

        let mut pass_count = 0;
        let mut fail_count = 0;
        let mut error_count = 0;
        let mut any_running = false;
        for status in store.statuses() {
            match status {
                TestStatus::Pass => pass_count += 1,
                TestStatus::Fail => fail_count += 1,
                TestStatus::Error { .. } => {
                    fail_count += 1;
                    error_count += 1;
                }
                TestStatus::Running => any_running = true,
                TestStatus::NotRun => {}
            }
        }

        let completed_count = pass_count + fail_count;
        let success_pct = percent(pass_count, completed_count);
        let is_complete = completed_count == total_count && total_count > 0 && !session.is_running;

        let overall_status = if store.is_empty() {
            OverallStatus::NotRun
        } else if any_running {
            OverallStatus::Running
        } else if fail_count > 0 {
            OverallStatus::IssuesFound
        } else {
            OverallStatus::AllPassed
        };

        Self {
            total_count,
            pass_count,
            fail_count,
            error_count,
            completed_count,
            success_pct,
            is_complete,
            overall_status,
        }
    }
}
