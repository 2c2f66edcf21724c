//! Background runtime for the orphaned-repository cleaner.

pub mod cleaner;
mod error;
mod health;
mod runtime;

pub use cleaner::{spawn, spawn_with_shutdown, CleanerHandle, CleanerSettings};
pub use error::DaemonError;
pub use health::CleanerStatus;
pub use runtime::{init_tracing, run, start_blocking, LOG_FORMAT_ENV};
