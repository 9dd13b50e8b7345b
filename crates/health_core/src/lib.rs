//! # health_core
//!
//! Check orchestration and result aggregation for the Office health check.
//!
//! This crate walks a catalog of named compatibility checks, grouped into
//! categories, in a fixed order and derives an overall verdict from the
//! results.
//!
//! # Architecture
//!
//! - **Suite**: the immutable catalog of categories and tests
//! - **Store**: per-run status of every touched test
//! - **Session**: run activity, progress and last completion time
//! - **Executor**: the capability that performs one check
//! - **Orchestrator**: drives a run, one check at a time, and implements reset
//! - **Aggregate**: counts, success rate and overall status, derived on demand
//!
//! # Example
//!
//! ```rust,no_run
//! use health_core::{HealthConfig, Orchestrator, RunOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HealthConfig::resolve(None)?;
//!     let orchestrator = Orchestrator::new(config.suite(), config.build_executor()?);
//!
//!     if let RunOutcome::Completed(summary) = orchestrator.start().await {
//!         println!("{}: {}% passed", summary.report.overall_status, summary.report.success_pct);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod executor;
pub mod mock;
pub mod orchestrator;
pub mod session;
pub mod status;
pub mod store;
pub mod suite;

pub use aggregate::{AggregateReport, OverallStatus};
pub use config::{CheckRef, ExecutorConfig, ExecutorKind, HealthConfig, SystemInfo};
pub use error::{ExecutorError, HealthError, HealthResult};
pub use executor::{CommandExecutor, Executor, ExecutorResult, SimulatedExecutor};
pub use mock::{CapturedCall, HoldHandle, RecordingExecutor};
pub use orchestrator::{Orchestrator, RunEvent, RunOutcome, RunSummary};
pub use session::{percent, RunSession};
pub use status::{Outcome, TestStatus};
pub use store::RunStateStore;
pub use suite::{Category, SuiteDefinition, TestId, TestKey};
