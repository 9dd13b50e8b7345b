//! Executor seam: the capability that actually performs a check.
//!
//! The orchestrator calls [`Executor::execute`] exactly once per test per
//! run and suspends until it resolves. Timeouts and retries belong to the
//! executor, never to the orchestrator.

use std::collections::HashSet;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ExecutorError;
use crate::status::Outcome;

/// Result of a single executor call.
pub type ExecutorResult = Result<Outcome, ExecutorError>;

/// Performs one named check against the target application.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, category: &str, test: &str) -> ExecutorResult;
}

/// Stand-in backend: waits a fixed latency, then passes every check except
/// the configured failing ones.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    latency: Duration,
    failing: HashSet<(String, String)>,
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(Duration::from_millis(240)).failing("Outlook", "Receive Loopback")
    }
}

impl SimulatedExecutor {
    /// A simulator that passes everything after `latency`.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failing: HashSet::new(),
        }
    }

    /// Mark a (category, test) pair as failing.
    pub fn failing(mut self, category: impl Into<String>, test: impl Into<String>) -> Self {
        self.failing.insert((category.into(), test.into()));
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl Executor for SimulatedExecutor {
    async fn execute(&self, category: &str, test: &str) -> ExecutorResult {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let fails = self
            .failing
            .contains(&(category.to_string(), test.to_string()));
        debug!("Simulated {} / {}: {}", category, test, if fails { "fail" } else { "pass" });
        Ok(if fails { Outcome::Fail } else { Outcome::Pass })
    }
}

/// Delegates each check to an external automation program.
///
/// The program is invoked as `program [args...] <category> <test>`. Exit
/// status 0 is a pass, any other exit status a fail. Failing to spawn or
/// exceeding the timeout is reported as an [`ExecutorError`].
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Executor for CommandExecutor {
    async fn execute(&self, category: &str, test: &str) -> ExecutorResult {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(category)
            .arg(test)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ExecutorError::Spawn(format!("{}: {}", self.program, e)))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ExecutorError::Backend(e.to_string()))?,
            Err(_) => {
                warn!("Check {} / {} timed out", category, test);
                return Err(ExecutorError::Timeout(self.timeout.as_millis() as u64));
            }
        };

        if output.status.success() {
            Ok(Outcome::Pass)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(
                "Check {} / {} exited with {:?}: {}",
                category,
                test,
                output.status.code(),
                stderr.trim()
            );
            Ok(Outcome::Fail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_default_fails_receive_loopback() {
        let executor =
            SimulatedExecutor::new(Duration::ZERO).failing("Outlook", "Receive Loopback");
        assert_eq!(executor.execute("Outlook", "Receive Loopback").await, Ok(Outcome::Fail));
        assert_eq!(executor.execute("Outlook", "Search").await, Ok(Outcome::Pass));
        assert_eq!(executor.execute("Word", "Receive Loopback").await, Ok(Outcome::Pass));
    }

    #[test]
    fn test_simulated_default_latency() {
        assert_eq!(SimulatedExecutor::default().latency(), Duration::from_millis(240));
    }

    #[tokio::test]
    async fn test_command_executor_spawn_failure() {
        let executor = CommandExecutor::new("/nonexistent/health-backend");
        let result = executor.execute("Word", "Launch").await;
        assert!(matches!(result, Err(ExecutorError::Spawn(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_executor_exit_status() {
        let pass = CommandExecutor::new("true");
        assert_eq!(pass.execute("Word", "Launch").await, Ok(Outcome::Pass));

        let fail = CommandExecutor::new("false");
        assert_eq!(fail.execute("Word", "Launch").await, Ok(Outcome::Fail));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_executor_receives_names() {
        // `sh -c <script> <$0> <$1> <$2>`: category and test land in $1 and $2.
        let executor = CommandExecutor::new("sh").args([
            "-c",
            r#"[ "$1" = "Excel" ] && [ "$2" = "CSV Import" ]"#,
            "check",
        ]);
        assert_eq!(executor.execute("Excel", "CSV Import").await, Ok(Outcome::Pass));
        assert_eq!(executor.execute("Excel", "Recalc").await, Ok(Outcome::Fail));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_executor_timeout() {
        let executor = CommandExecutor::new("sh")
            .args(["-c", "sleep 5", "check"])
            .timeout(Duration::from_millis(50));
        let result = executor.execute("Teams", "Join Meeting").await;
        assert_eq!(result, Err(ExecutorError::Timeout(50)));
        assert_eq!(
            ExecutorError::Timeout(50).to_string(),
            "Check timed out after 50 ms"
        );
    }
}
