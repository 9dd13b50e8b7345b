//! Run orchestration.
//!
//! The [`Orchestrator`] is the only writer of the run state store and the run
//! session. A run walks the flattened suite strictly in order, one check at a
//! time, and suspends only while awaiting the executor. Every committed write
//! is checked against the epoch the run was started with, so a reset (or a
//! newer run) silently discards anything a superseded loop still produces.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use health_core::{Orchestrator, SimulatedExecutor, SuiteDefinition};
//!
//! # async fn demo() {
//! let orchestrator = Orchestrator::new(
//!     SuiteDefinition::office(),
//!     Arc::new(SimulatedExecutor::default()),
//! );
//! let outcome = orchestrator.start().await;
//! println!("{:?}", orchestrator.report().overall_status);
//! # let _ = outcome;
//! # }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregate::AggregateReport;
use crate::error::HealthResult;
use crate::executor::Executor;
use crate::session::{percent, RunSession};
use crate::status::TestStatus;
use crate::store::RunStateStore;
use crate::suite::{SuiteDefinition, TestKey};

const EVENT_CAPACITY: usize = 256;

/// Notification sent to observers right after a mutation is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        run_id: Uuid,
        total: usize,
    },
    TestStarted {
        run_id: Uuid,
        key: TestKey,
        /// 1-based position in run order.
        position: usize,
    },
    TestFinished {
        run_id: Uuid,
        key: TestKey,
        status: TestStatus,
        progress_pct: u8,
    },
    RunFinished {
        run_id: Uuid,
        completed_at: DateTime<Utc>,
    },
    RunSuperseded {
        run_id: Uuid,
    },
    Reset,
}

/// Summary of a run that finished naturally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub report: AggregateReport,
}

impl RunSummary {
    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}

/// What a call to [`Orchestrator::start`] amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A run was already active; nothing happened.
    AlreadyRunning,
    /// The run walked the whole suite.
    Completed(RunSummary),
    /// A reset or a newer run invalidated this one before it finished.
    Superseded { run_id: Uuid },
}

#[derive(Debug, Default)]
struct RunState {
    store: RunStateStore,
    session: RunSession,
}

/// Identity of a run that has been admitted but not yet driven.
#[derive(Debug, Clone, Copy)]
struct RunTicket {
    run_id: Uuid,
    epoch: u64,
    started_at: DateTime<Utc>,
}

struct Inner {
    suite: SuiteDefinition,
    executor: Arc<dyn Executor>,
    /// Held across every executor call, so a superseded run's in-flight
    /// call finishes before a newer run reaches the executor.
    lane: Mutex<()>,
    state: RwLock<RunState>,
    events: broadcast::Sender<RunEvent>,
}

/// Owner of the run lifecycle. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    /// Create an orchestrator for `suite`, delegating checks to `executor`.
    pub fn new(suite: SuiteDefinition, executor: Arc<dyn Executor>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                suite,
                executor,
                lane: Mutex::new(()),
                state: RwLock::new(RunState::default()),
                events,
            }),
        }
    }

    pub fn suite(&self) -> &SuiteDefinition {
        &self.inner.suite
    }

    /// Subscribe to run events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.inner.events.subscribe()
    }

    /// Snapshot of the run session.
    pub fn session(&self) -> RunSession {
        self.inner.state.read().session.clone()
    }

    /// Snapshot of the run state store.
    pub fn store(&self) -> RunStateStore {
        self.inner.state.read().store.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.read().session.is_running
    }

    pub fn status(&self, key: TestKey) -> TestStatus {
        self.inner.state.read().store.status(key)
    }

    /// Status of a test by name.
    pub fn status_of(&self, category: &str, test: &str) -> HealthResult<TestStatus> {
        let key = self.inner.suite.lookup(category, test)?;
        Ok(self.status(key))
    }

    /// Aggregate figures for the current state.
    pub fn report(&self) -> AggregateReport {
        let state = self.inner.state.read();
        AggregateReport::compute(&self.inner.suite, &state.store, &state.session)
    }

    /// Run the whole suite to completion.
    ///
    /// Returns [`RunOutcome::AlreadyRunning`] without touching any state when
    /// a run is active.
    ///
    /// The run is admitted when the future is first polled. Dropping the
    /// future before it resolves leaves the session marked as running, and
    /// further starts are refused until [`reset`](Self::reset). Use
    /// [`spawn`](Self::spawn) when the caller may go away mid-run.
    pub async fn start(&self) -> RunOutcome {
        match self.admit() {
            Some(ticket) => self.drive(ticket).await,
            None => RunOutcome::AlreadyRunning,
        }
    }

    /// Start a run on a background task.
    ///
    /// The run is admitted before this returns, so an immediate second call
    /// observes `is_running` and yields `None`.
    pub fn spawn(&self) -> Option<JoinHandle<RunOutcome>> {
        let ticket = self.admit()?;
        let this = self.clone();
        Some(tokio::spawn(async move { this.drive(ticket).await }))
    }

    /// Clear all run state unconditionally and invalidate any in-flight run.
    pub fn reset(&self) {
        {
            let mut state = self.inner.state.write();
            state.session.reset();
            state.store.clear();
        }
        info!("Run state reset");
        self.emit(RunEvent::Reset);
    }

    fn admit(&self) -> Option<RunTicket> {
        let ticket = {
            let mut state = self.inner.state.write();
            if state.session.is_running {
                debug!("Run already in progress, ignoring start");
                return None;
            }
            let epoch = state.session.begin();
            state.store.clear();
            RunTicket {
                run_id: Uuid::new_v4(),
                epoch,
                started_at: Utc::now(),
            }
        };

        let total = self.inner.suite.total_count();
        info!("Starting health check run {} ({} checks)", ticket.run_id, total);
        self.emit(RunEvent::RunStarted {
            run_id: ticket.run_id,
            total,
        });
        Some(ticket)
    }

    async fn drive(&self, ticket: RunTicket) -> RunOutcome {
        let RunTicket { run_id, epoch, started_at } = ticket;
        let tests = self.inner.suite.flatten();
        let total = tests.len();

        for (i, id) in tests.iter().enumerate() {
            if !self.commit(epoch, |state| state.store.mark_running(id.key)) {
                return self.superseded(run_id);
            }
            self.emit(RunEvent::TestStarted {
                run_id,
                key: id.key,
                position: i + 1,
            });
            debug!("[{}/{}] Running {}", i + 1, total, id);

            let result = {
                let _lane = self.inner.lane.lock().await;
                self.inner.executor.execute(id.category, id.name).await
            };

            let progress_pct = percent(i + 1, total);
            let mut status = TestStatus::NotRun;
            let committed = self.commit(epoch, |state| {
                match &result {
                    Ok(outcome) => state.store.record_outcome(id.key, *outcome),
                    Err(e) => state.store.record_error(id.key, e),
                }
                state.session.progress_pct = progress_pct;
                status = state.store.status(id.key);
            });
            if !committed {
                return self.superseded(run_id);
            }

            match &status {
                TestStatus::Error { reason } => {
                    warn!("[{}/{}] {} could not be checked: {}", i + 1, total, id, reason)
                }
                _ => info!("[{}/{}] {}: {}", i + 1, total, id, status),
            }
            self.emit(RunEvent::TestFinished {
                run_id,
                key: id.key,
                status,
                progress_pct,
            });
        }

        let completed_at = Utc::now();
        let mut report = None;
        let committed = self.commit(epoch, |state| {
            state.session.finish(completed_at);
            report = Some(AggregateReport::compute(
                &self.inner.suite,
                &state.store,
                &state.session,
            ));
        });
        let report = match report {
            Some(report) if committed => report,
            _ => return self.superseded(run_id),
        };

        info!(
            "Run {} finished: {} ({}/{} passed)",
            run_id, report.overall_status, report.pass_count, report.total_count
        );
        self.emit(RunEvent::RunFinished { run_id, completed_at });

        RunOutcome::Completed(RunSummary {
            run_id,
            started_at,
            completed_at,
            report,
        })
    }

    /// Apply `write` if `epoch` is still current. Returns whether it was applied.
    fn commit(&self, epoch: u64, write: impl FnOnce(&mut RunState)) -> bool {
        let mut state = self.inner.state.write();
        if !state.session.is_current(epoch) {
            return false;
        }
        write(&mut state);
        true
    }

    fn superseded(&self, run_id: Uuid) -> RunOutcome {
        warn!("Run {} superseded, discarding its remaining writes", run_id);
        self.emit(RunEvent::RunSuperseded { run_id });
        RunOutcome::Superseded { run_id }
    }

    fn emit(&self, event: RunEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::OverallStatus;
    use crate::executor::MockExecutor;
    use crate::status::Outcome;

    fn suite() -> SuiteDefinition {
        SuiteDefinition::new()
            .category("A", ["t1", "t2"])
            .category("B", ["t3"])
    }

    #[tokio::test]
    async fn test_executor_called_once_per_test() {
        let mut executor = MockExecutor::new();
        executor
            .expect_execute()
            .withf(|category, test| category == "A" && test == "t2")
            .times(1)
            .returning(|_, _| Ok(Outcome::Fail));
        executor
            .expect_execute()
            .withf(|category, test| !(category == "A" && test == "t2"))
            .times(2)
            .returning(|_, _| Ok(Outcome::Pass));

        let orchestrator = Orchestrator::new(suite(), Arc::new(executor));
        let outcome = orchestrator.start().await;

        let RunOutcome::Completed(summary) = outcome else {
            panic!("run did not complete");
        };
        assert_eq!(summary.report.pass_count, 2);
        assert_eq!(summary.report.fail_count, 1);
        assert_eq!(summary.report.overall_status, OverallStatus::IssuesFound);
        assert!(summary.duration_ms() >= 0);
    }

    #[tokio::test]
    async fn test_initial_state() {
        let orchestrator = Orchestrator::new(suite(), Arc::new(MockExecutor::new()));
        let session = orchestrator.session();
        assert!(!session.is_running);
        assert_eq!(session.progress_pct, 0);
        assert!(session.last_completed_at.is_none());
        assert!(orchestrator.store().is_empty());
        assert_eq!(orchestrator.report().overall_status, OverallStatus::NotRun);
    }

    #[tokio::test]
    async fn test_status_of_unknown_name() {
        let orchestrator = Orchestrator::new(suite(), Arc::new(MockExecutor::new()));
        assert!(orchestrator.status_of("A", "missing").is_err());
        assert_eq!(orchestrator.status_of("A", "t1").unwrap(), TestStatus::NotRun);
    }

    #[tokio::test]
    async fn test_empty_suite_run_completes() {
        let orchestrator = Orchestrator::new(SuiteDefinition::new(), Arc::new(MockExecutor::new()));
        let outcome = orchestrator.start().await;
        assert!(matches!(outcome, RunOutcome::Completed(_)));
        let session = orchestrator.session();
        assert!(!session.is_running);
        assert!(session.last_completed_at.is_some());
        assert!(!orchestrator.report().is_complete);
    }
}
