//! # builder-cleaner
//!
//! Orphaned repository directory detection and removal.
//!
//! Call [`cycle::run`] to reconcile a git home against a [`NamespaceSource`]
//! once. Deletions serialize on a [`RepoLock`] shared with every other
//! subsystem that mutates repository directories.

pub mod cycle;
pub mod delete;
pub mod diff;
pub mod error;
pub mod lock;
pub mod scan;
pub mod source;

pub use cycle::CycleReport;
pub use delete::{DeleteFailure, DeleteReport, Removal};
pub use error::{CleanerError, ListError};
pub use lock::{RepoLock, RepoLockGuard};
pub use source::{FileNamespaceSource, ListOptions, NamespaceSource, StaticNamespaceSource};
