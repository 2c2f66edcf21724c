//! One reconciliation pass: list → scan → diff → delete.
//!
//! Shared by the daemon's periodic loop and `builder cleaner once`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use builder_core::DOT_GIT_SUFFIX;

use crate::delete::{self, orphan_path, DeleteFailure};
use crate::diff;
use crate::lock::RepoLock;
use crate::scan;
use crate::source::{ListOptions, NamespaceSource};
use crate::CleanerError;

/// Summary of one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub git_home: PathBuf,
    pub dry_run: bool,
    pub namespaces: usize,
    pub scanned: Vec<PathBuf>,
    /// Orphaned repository names, suffix stripped.
    pub orphans: Vec<String>,
    pub removed: Vec<PathBuf>,
    pub already_gone: Vec<PathBuf>,
    pub failed: Vec<DeleteFailure>,
    pub duration_ms: u128,
}

impl CycleReport {
    /// Paths that would be (or were) targeted for removal.
    pub fn orphan_paths(&self) -> Vec<PathBuf> {
        self.orphans
            .iter()
            .map(|name| orphan_path(&self.git_home, name))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty()
    }
}

/// Run a single cycle against `home`.
///
/// A list or scan failure returns early with nothing deleted. Deletion
/// failures are recorded in the report and never fail the cycle. With
/// `dry_run` the orphan set is computed but the lock is never taken and
/// nothing is removed.
pub fn run(
    home: &Path,
    source: &dyn NamespaceSource,
    lock: &RepoLock,
    dry_run: bool,
) -> Result<CycleReport, CleanerError> {
    let started = Instant::now();

    let namespaces = source.list(&ListOptions::everything())?;
    let scanned = scan::local_dirs(home, scan::has_git_suffix)?;

    let repo_names = diff::strip_suffixes(&scan::base_names(&scanned), DOT_GIT_SUFFIX);
    let orphans = diff::orphans(namespaces.names(), &repo_names);

    let deletions = if dry_run {
        delete::DeleteReport::default()
    } else {
        delete::remove_orphans(home, &orphans, lock)
    };

    Ok(CycleReport {
        git_home: home.to_path_buf(),
        dry_run,
        namespaces: namespaces.len(),
        scanned,
        orphans,
        removed: deletions.removed,
        already_gone: deletions.already_gone,
        failed: deletions.failed,
        duration_ms: started.elapsed().as_millis(),
    })
}
