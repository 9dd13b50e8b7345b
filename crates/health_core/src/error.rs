//! Error types for the health check core.

use thiserror::Error;

/// Result type alias for core operations.
pub type HealthResult<T> = Result<T, HealthError>;

/// Errors raised at the boundary of the core (catalog construction,
/// configuration, name lookups). The run loop itself never fails.
#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown test: {category} / {test}")]
    UnknownTest { category: String, test: String },

    #[error("Category name must not be empty")]
    EmptyCategoryName,

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("Duplicate test '{test}' in category '{category}'")]
    DuplicateTest { category: String, test: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors an executor reports when a check could not be carried out at all.
///
/// These are distinct from a check that ran and failed; the orchestrator
/// records them as [`TestStatus::Error`](crate::TestStatus::Error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Failed to spawn check backend: {0}")]
    Spawn(String),

    #[error("Check timed out after {0} ms")]
    Timeout(u64),

    #[error("Check backend error: {0}")]
    Backend(String),
}
