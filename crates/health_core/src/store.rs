//! Per-run record of test statuses.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::error::ExecutorError;
use crate::status::{Outcome, TestStatus};
use crate::suite::TestKey;

/// Status of every test touched by the current run.
///
/// Entries are only ever `Running` or terminal; the write API has no way to
/// store `NotRun`, and [`RunStateStore::status`] reports absence as `NotRun`.
///
/// Serializes as a list of `{key, status}` entries in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStateStore {
    entries: HashMap<TestKey, TestStatus>,
}

#[derive(Serialize)]
struct Entry<'a> {
    key: TestKey,
    #[serde(flatten)]
    status: &'a TestStatus,
}

impl Serialize for RunStateStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<Entry<'_>> = self
            .entries
            .iter()
            .map(|(key, status)| Entry { key: *key, status })
            .collect();
        entries.sort_by_key(|entry| entry.key);
        serializer.collect_seq(entries)
    }
}

impl RunStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_running(&mut self, key: TestKey) {
        self.entries.insert(key, TestStatus::Running);
    }

    pub(crate) fn record_outcome(&mut self, key: TestKey, outcome: Outcome) {
        self.entries.insert(key, outcome.into());
    }

    pub(crate) fn record_error(&mut self, key: TestKey, error: &ExecutorError) {
        self.entries.insert(
            key,
            TestStatus::Error {
                reason: error.to_string(),
            },
        );
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Status of a test, `NotRun` if the current run has not touched it.
    pub fn status(&self, key: TestKey) -> TestStatus {
        self.entries.get(&key).cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Stored entries, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&TestKey, &TestStatus)> {
        self.entries.iter()
    }

    pub fn statuses(&self) -> impl Iterator<Item = &TestStatus> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_entry_reads_not_run() {
        let store = RunStateStore::new();
        assert_eq!(store.status(TestKey::new(0, 0)), TestStatus::NotRun);
        assert!(store.is_empty());
    }

    #[test]
    fn test_lifecycle_writes() {
        let mut store = RunStateStore::new();
        let key = TestKey::new(1, 2);

        store.mark_running(key);
        assert_eq!(store.status(key), TestStatus::Running);

        store.record_outcome(key, Outcome::Fail);
        assert_eq!(store.status(key), TestStatus::Fail);
        assert_eq!(store.len(), 1);

        let other = TestKey::new(0, 0);
        store.record_error(other, &ExecutorError::Timeout(5000));
        assert!(matches!(store.status(other), TestStatus::Error { .. }));

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.status(key), TestStatus::NotRun);
    }

    #[test]
    fn test_serializes_in_run_order() {
        let mut store = RunStateStore::new();
        store.record_outcome(TestKey::new(1, 0), Outcome::Fail);
        store.mark_running(TestKey::new(0, 1));
        store.record_outcome(TestKey::new(0, 0), Outcome::Pass);

        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "key": { "category": 0, "test": 0 }, "status": "pass" },
                { "key": { "category": 0, "test": 1 }, "status": "running" },
                { "key": { "category": 1, "test": 0 }, "status": "fail" },
            ])
        );
    }
}
