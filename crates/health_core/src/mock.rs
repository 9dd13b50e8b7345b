//! Recording executor for testing.
//!
//! Captures every call in order and returns scripted outcomes, so run order
//! and status transitions can be verified without a real automation backend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Notify;

use crate::error::ExecutorError;
use crate::executor::{Executor, ExecutorResult};
use crate::status::Outcome;

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub category: String,
    pub test: String,
}

/// Point at which the executor parks a call until released.
#[derive(Debug, Default)]
struct HoldPoint {
    call: usize,
    reached: Notify,
    release: Notify,
}

/// Handle to a parked call, returned by [`RecordingExecutor::hold_at`].
#[derive(Debug, Clone)]
pub struct HoldHandle {
    point: Arc<HoldPoint>,
}

impl HoldHandle {
    /// Wait until the held call has been entered.
    pub async fn reached(&self) {
        self.point.reached.notified().await;
    }

    /// Let the held call return.
    pub fn release(&self) {
        self.point.release.notify_one();
    }
}

/// Executor that records calls and answers from a script.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    calls: Arc<RwLock<Vec<CapturedCall>>>,
    failing: Arc<RwLock<HashSet<(String, String)>>>,
    errors: Arc<RwLock<HashMap<(String, String), ExecutorError>>>,
    latency: Duration,
    hold: Option<Arc<HoldPoint>>,
}

impl RecordingExecutor {
    /// Create an executor that passes every check immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `Fail` for the given check.
    pub fn fail(self, category: impl Into<String>, test: impl Into<String>) -> Self {
        self.failing.write().insert((category.into(), test.into()));
        self
    }

    /// Report an executor error for the given check.
    pub fn error(
        self,
        category: impl Into<String>,
        test: impl Into<String>,
        error: ExecutorError,
    ) -> Self {
        self.errors.write().insert((category.into(), test.into()), error);
        self
    }

    /// Sleep this long inside every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Park the `call`-th invocation (0-based) until the handle releases it.
    pub fn hold_at(mut self, call: usize) -> (Self, HoldHandle) {
        let point = Arc::new(HoldPoint {
            call,
            ..HoldPoint::default()
        });
        self.hold = Some(point.clone());
        (self, HoldHandle { point })
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Clear all captured calls.
    pub fn clear_calls(&self) {
        self.calls.write().clear();
    }

    fn record_call(&self, category: &str, test: &str) -> usize {
        let mut calls = self.calls.write();
        calls.push(CapturedCall {
            category: category.to_string(),
            test: test.to_string(),
        });
        calls.len() - 1
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(&self, category: &str, test: &str) -> ExecutorResult {
        let index = self.record_call(category, test);

        if let Some(point) = self.hold.as_ref().filter(|p| p.call == index) {
            point.reached.notify_one();
            point.release.notified().await;
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let key = (category.to_string(), test.to_string());
        if let Some(error) = self.errors.read().get(&key).cloned() {
            return Err(error);
        }
        if self.failing.read().contains(&key) {
            Ok(Outcome::Fail)
        } else {
            Ok(Outcome::Pass)
        }
    }
}
