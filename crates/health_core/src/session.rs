//! Run session record: activity flag, progress and completion time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutable record of the current run.
///
/// `epoch` increases on every start and every reset. A run loop captures the
/// epoch it was started with and commits nothing once it no longer matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSession {
    pub is_running: bool,
    pub progress_pct: u8,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub epoch: u64,
}

impl RunSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new run and return its epoch.
    pub(crate) fn begin(&mut self) -> u64 {
        self.epoch += 1;
        self.is_running = true;
        self.progress_pct = 0;
        self.epoch
    }

    /// Invalidate any in-flight run and clear the session.
    pub(crate) fn reset(&mut self) {
        self.epoch += 1;
        self.is_running = false;
        self.progress_pct = 0;
        self.last_completed_at = None;
    }

    pub(crate) fn finish(&mut self, at: DateTime<Utc>) {
        self.is_running = false;
        self.last_completed_at = Some(at);
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
}

/// `round(100 * part / whole)` with halves rounded up, `0` when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u64;
    let whole = whole as u64;
    ((200 * part + whole) / (2 * whole)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(0, 3), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(1, 8), 13); // 12.5 rounds up
        assert_eq!(percent(1, 200), 1); // 0.5 rounds up
        assert_eq!(percent(5, 0), 0);
    }

    #[test]
    fn test_epoch_advances_on_begin_and_reset() {
        let mut session = RunSession::new();
        let first = session.begin();
        assert!(session.is_running);
        assert!(session.is_current(first));

        session.reset();
        assert!(!session.is_current(first));
        assert!(!session.is_running);
        assert_eq!(session.progress_pct, 0);

        let second = session.begin();
        assert!(second > first);
    }

    #[test]
    fn test_finish_sets_completion_time() {
        let mut session = RunSession::new();
        session.begin();
        let now = Utc::now();
        session.finish(now);
        assert!(!session.is_running);
        assert_eq!(session.last_completed_at, Some(now));

        session.reset();
        assert!(session.last_completed_at.is_none());
    }
}
