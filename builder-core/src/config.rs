//! Cleaner configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.builder/
//!   config.yaml   (git_home, poll interval, failure threshold, namespaces file)
//! ```
//!
//! # API pattern
//!
//! Like the rest of the crate, path-dependent functions come in two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Environment overrides go through [`CleanerConfig::apply_env_from`] so tests
//! can feed a closure instead of mutating the process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding [`CleanerConfig::git_home`].
pub const GIT_HOME_ENV: &str = "GIT_HOME";

/// Environment variable overriding [`CleanerConfig::poll_interval_secs`].
pub const POLL_INTERVAL_ENV: &str = "CLEANER_POLL_SLEEP_DURATION_SEC";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 10;

/// Settings consumed by the orphan-directory cleaner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Directory holding one `<namespace>.git` repository per tenant.
    #[serde(default)]
    pub git_home: PathBuf,

    #[serde(
        rename = "cleaner_poll_sleep_duration_sec",
        default = "default_poll_interval_secs"
    )]
    pub poll_interval_secs: u64,

    /// Consecutive failed cycles before the cleaner reports itself unhealthy.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Namespace list file read by the file-backed namespace source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces_file: Option<PathBuf>,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_failure_threshold() -> u32 {
    DEFAULT_FAILURE_THRESHOLD
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            git_home: PathBuf::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            namespaces_file: None,
        }
    }
}

impl CleanerConfig {
    /// Config rooted at `git_home` with every other field at its default.
    pub fn new(git_home: impl Into<PathBuf>) -> Self {
        Self {
            git_home: git_home.into(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Apply `GIT_HOME` / `CLEANER_POLL_SLEEP_DURATION_SEC` from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(home) = lookup(GIT_HOME_ENV).filter(|v| !v.trim().is_empty()) {
            self.git_home = PathBuf::from(home);
        }
        if let Some(raw) = lookup(POLL_INTERVAL_ENV).filter(|v| !v.trim().is_empty()) {
            self.poll_interval_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        var: POLL_INTERVAL_ENV,
                        value: raw.clone(),
                    })?;
        }
        Ok(())
    }

    /// Reject values the cleaner cannot run with.
    ///
    /// A zero poll interval would turn the loop into a busy spin, so it is
    /// refused here rather than clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git_home.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "git_home is required (set it in the config file or via {GIT_HOME_ENV})"
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "cleaner_poll_sleep_duration_sec must be at least 1".to_string(),
            ));
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "failure_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.builder/config.yaml`: pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".builder").join("config.yaml")
}

/// `default_path_at` convenience wrapper.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    Ok(default_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load a config file.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<CleanerConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load `<home>/.builder/config.yaml` if present, otherwise defaults.
pub fn load_or_default_at(home: &Path) -> Result<CleanerConfig, ConfigError> {
    match load_at(&default_path_at(home)) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound { .. }) => Ok(CleanerConfig::default()),
        Err(err) => Err(err),
    }
}

/// `load_or_default_at` convenience wrapper.
pub fn load_or_default() -> Result<CleanerConfig, ConfigError> {
    load_or_default_at(&home()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
