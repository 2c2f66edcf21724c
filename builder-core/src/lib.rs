//! Builder core library: namespace types, cleaner configuration, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and namespace snapshots
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / env overrides / validate

pub mod config;
pub mod error;
pub mod types;

pub use config::CleanerConfig;
pub use error::ConfigError;
pub use types::{Namespace, NamespaceList, NamespaceName, DOT_GIT_SUFFIX};
