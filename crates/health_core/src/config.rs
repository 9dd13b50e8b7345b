//! Health check configuration.
//!
//! Loaded from a TOML file, falling back to the built-in Office catalog and
//! the simulated executor. A few settings can be overridden from the
//! environment.
//!
//! ```toml
//! [system]
//! os_version = "15.0 (Tahoe)"
//! office_version = "16.86 (Current Channel)"
//!
//! [[categories]]
//! name = "Word"
//! tests = ["Launch", "Sign In"]
//!
//! [executor]
//! kind = "command"
//! program = "/usr/local/bin/office-check"
//! timeout_secs = 90
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HealthError, HealthResult};
use crate::executor::{CommandExecutor, Executor, SimulatedExecutor};
use crate::suite::{Category, SuiteDefinition};

pub const ENV_LATENCY_MS: &str = "HEALTHCHECK_LATENCY_MS";
pub const ENV_EXECUTOR: &str = "HEALTHCHECK_EXECUTOR";

/// Versions of the system under test, shown in the overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub os_version: String,
    pub office_version: String,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            os_version: "15.0 (Tahoe)".to_string(),
            office_version: "16.86 (Current Channel)".to_string(),
        }
    }
}

/// Which executor backs the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    #[default]
    Simulated,
    Command,
}

impl std::str::FromStr for ExecutorKind {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            "command" => Ok(Self::Command),
            other => Err(HealthError::Config(format!("unknown executor kind '{}'", other))),
        }
    }
}

/// A (category, test) pair named in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRef {
    pub category: String,
    pub test: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub kind: ExecutorKind,
    /// Simulated latency per check.
    pub latency_ms: u64,
    /// Checks the simulated executor reports as failing.
    pub failing: Vec<CheckRef>,
    /// Automation program for the command executor.
    pub program: Option<String>,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kind: ExecutorKind::Simulated,
            latency_ms: 240,
            failing: vec![CheckRef {
                category: "Outlook".to_string(),
                test: "Receive Loopback".to_string(),
            }],
            program: None,
            args: Vec::new(),
            timeout_secs: 60,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub system: SystemInfo,
    pub categories: Vec<Category>,
    pub executor: ExecutorConfig,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            system: SystemInfo::default(),
            categories: SuiteDefinition::office().categories().to_vec(),
            executor: ExecutorConfig::default(),
        }
    }
}

impl HealthConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> HealthResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn load(path: impl AsRef<Path>) -> HealthResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults; then apply environment
    /// overrides.
    pub fn resolve(path: Option<&Path>) -> HealthResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `HEALTHCHECK_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_LATENCY_MS).ok().as_deref(),
            std::env::var(ENV_EXECUTOR).ok().as_deref(),
        );
    }

    fn apply_overrides(&mut self, latency_ms: Option<&str>, executor: Option<&str>) {
        if let Some(value) = latency_ms {
            match value.parse::<u64>() {
                Ok(ms) => self.executor.latency_ms = ms,
                Err(_) => warn!("Ignoring invalid {}={}", ENV_LATENCY_MS, value),
            }
        }
        if let Some(value) = executor {
            match value.parse::<ExecutorKind>() {
                Ok(kind) => self.executor.kind = kind,
                Err(e) => warn!("Ignoring {}: {}", ENV_EXECUTOR, e),
            }
        }
    }

    pub fn validate(&self) -> HealthResult<()> {
        let suite = self.suite();
        suite.validate()?;

        if self.executor.kind == ExecutorKind::Command && self.executor.program.is_none() {
            return Err(HealthError::Config(
                "executor.program is required for the command executor".to_string(),
            ));
        }
        Ok(())
    }

    /// The catalog this configuration describes.
    pub fn suite(&self) -> SuiteDefinition {
        SuiteDefinition::from_categories(self.categories.clone())
    }

    /// Build the configured executor.
    pub fn build_executor(&self) -> HealthResult<Arc<dyn Executor>> {
        let cfg = &self.executor;
        match cfg.kind {
            ExecutorKind::Simulated => {
                debug!("Using simulated executor ({} ms latency)", cfg.latency_ms);
                let suite = self.suite();
                for check in &cfg.failing {
                    if let Err(e) = suite.lookup(&check.category, &check.test) {
                        warn!("Failing check does not match the catalog: {}", e);
                    }
                }
                let executor = cfg.failing.iter().fold(
                    SimulatedExecutor::new(Duration::from_millis(cfg.latency_ms)),
                    |executor, check| executor.failing(&check.category, &check.test),
                );
                Ok(Arc::new(executor))
            }
            ExecutorKind::Command => {
                let program = cfg.program.as_deref().ok_or_else(|| {
                    HealthError::Config("executor.program is not set".to_string())
                })?;
                debug!("Using command executor: {}", program);
                Ok(Arc::new(
                    CommandExecutor::new(program)
                        .args(cfg.args.iter().cloned())
                        .timeout(Duration::from_secs(cfg.timeout_secs)),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = HealthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.suite().total_count(), 27);
        assert_eq!(config.executor.latency_ms, 240);
        assert_eq!(config.system.os_version, "15.0 (Tahoe)");
    }

    #[test]
    fn test_parse_partial_config() {
        let config = HealthConfig::from_toml(
            r#"
            [[categories]]
            name = "Teams"
            tests = ["Sign In", "Join Meeting"]

            [executor]
            latency_ms = 0
            failing = [{ category = "Teams", test = "Join Meeting" }]
            "#,
        )
        .unwrap();

        assert_eq!(config.suite().total_count(), 2);
        assert_eq!(config.executor.latency_ms, 0);
        assert_eq!(config.executor.kind, ExecutorKind::Simulated);
        assert_eq!(config.system, SystemInfo::default());
    }

    #[test]
    fn test_custom_catalog_keeps_default_failing_check() {
        // The default failing check names a category this catalog lacks; it is
        // simply never hit.
        let config = HealthConfig::from_toml(
            r#"
            [[categories]]
            name = "Teams"
            tests = ["Sign In"]
            "#,
        )
        .unwrap();
        assert_eq!(config.executor.failing.len(), 1);
        assert!(config.build_executor().is_ok());
    }

    #[test]
    fn test_command_executor_requires_program() {
        let result = HealthConfig::from_toml(
            r#"
            [executor]
            kind = "command"
            "#,
        );
        assert!(matches!(result, Err(HealthError::Config(_))));
    }

    #[test]
    fn test_duplicate_tests_rejected() {
        let result = HealthConfig::from_toml(
            r#"
            [[categories]]
            name = "Excel"
            tests = ["Launch", "Launch"]
            "#,
        );
        assert!(matches!(result, Err(HealthError::DuplicateTest { .. })));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            HealthConfig::from_toml("categories = 3"),
            Err(HealthError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [system]
            os_version = "14.6 (Sonoma)"

            [executor]
            kind = "command"
            program = "/usr/local/bin/office-check"
            args = ["--json"]
            timeout_secs = 5
            "#
        )
        .unwrap();

        let config = HealthConfig::load(file.path()).unwrap();
        assert_eq!(config.system.os_version, "14.6 (Sonoma)");
        assert_eq!(config.system.office_version, "16.86 (Current Channel)");
        assert_eq!(config.executor.kind, ExecutorKind::Command);
        assert!(config.build_executor().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = HealthConfig::load("/nonexistent/healthcheck.toml");
        assert!(matches!(result, Err(HealthError::Io(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = HealthConfig::default();
        config.apply_overrides(Some("15"), Some("COMMAND"));
        assert_eq!(config.executor.latency_ms, 15);
        assert_eq!(config.executor.kind, ExecutorKind::Command);

        config.apply_overrides(Some("soon"), Some("remote"));
        assert_eq!(config.executor.latency_ms, 15);
        assert_eq!(config.executor.kind, ExecutorKind::Command);
    }
}
