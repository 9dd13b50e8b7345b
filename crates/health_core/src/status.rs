//! Test status lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict an executor returns for a check that actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
}

/// Lifecycle state of a test within a run.
///
/// `NotRun -> Running -> {Pass, Fail, Error}`. Only a full reset leaves a
/// terminal state. `NotRun` is never stored; it is what an absent entry
/// reads as.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestStatus {
    #[default]
    NotRun,
    Running,
    Pass,
    Fail,
    /// The check could not be carried out.
    Error { reason: String },
}

impl TestStatus {
    /// Whether the test has reached a terminal state.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Pass | Self::Fail | Self::Error { .. })
    }

    /// Completed without passing. Errors count here alongside failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail | Self::Error { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotRun => "not run",
            Self::Running => "running",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error { .. } => "error",
        }
    }
}

impl From<Outcome> for TestStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Pass => Self::Pass,
            Outcome::Fail => Self::Fail,
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error { reason } => write!(f, "error ({})", reason),
            other => f.write_str(other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_classification() {
        assert!(!TestStatus::NotRun.is_completed());
        assert!(!TestStatus::Running.is_completed());
        assert!(TestStatus::Pass.is_completed());
        assert!(!TestStatus::Pass.is_failure());
        assert!(TestStatus::Fail.is_failure());
        let err = TestStatus::Error { reason: "timeout".into() };
        assert!(err.is_completed());
        assert!(err.is_failure());
        assert_eq!(err.to_string(), "error (timeout)");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TestStatus::Error { reason: "boom".into() }).unwrap();
        assert_eq!(json, r#"{"status":"error","reason":"boom"}"#);
        let json = serde_json::to_string(&TestStatus::Pass).unwrap();
        assert_eq!(json, r#"{"status":"pass"}"#);
    }
}
