//! Error types for builder-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading cleaner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// An environment override was present but could not be parsed.
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    /// The loaded values violate a constraint (empty home, zero interval, ...).
    #[error("invalid config: {0}")]
    Invalid(String),

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.builder/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
