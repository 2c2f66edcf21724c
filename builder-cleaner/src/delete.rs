//! Recursive removal of orphaned repository directories.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use builder_core::DOT_GIT_SUFFIX;

use crate::error::{delete_err, CleanerError};
use crate::lock::RepoLock;

/// Outcome of a single successful removal attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Removal {
    /// Directory existed and was removed.
    Removed(PathBuf),
    /// Directory had already disappeared (e.g. removed by another mutator).
    AlreadyGone(PathBuf),
}

/// A removal that failed, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Per-batch deletion results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub removed: Vec<PathBuf>,
    pub already_gone: Vec<PathBuf>,
    pub failed: Vec<DeleteFailure>,
}

/// `<home>/<name>.git`: pure, no I/O.
pub fn orphan_path(home: &Path, name: &str) -> PathBuf {
    home.join(format!("{name}{DOT_GIT_SUFFIX}"))
}

/// Remove `<home>/<name>.git` recursively while holding `lock`.
///
/// The lock covers exactly one removal and is released before returning,
/// whether or not the removal succeeded.
pub fn remove_orphan(home: &Path, name: &str, lock: &RepoLock) -> Result<Removal, CleanerError> {
    let path = orphan_path(home, name);
    let result = {
        let _guard = lock.lock();
        std::fs::remove_dir_all(&path)
    };
    match result {
        Ok(()) => Ok(Removal::Removed(path)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Removal::AlreadyGone(path)),
        Err(err) => Err(delete_err(path, err)),
    }
}

/// Remove every orphan in `names`, one lock acquisition each.
///
/// A failure is logged and recorded; it never stops the remaining removals.
pub fn remove_orphans(home: &Path, names: &[String], lock: &RepoLock) -> DeleteReport {
    let mut report = DeleteReport::default();
    for name in names {
        match remove_orphan(home, name, lock) {
            Ok(Removal::Removed(path)) => {
                tracing::info!(path = %path.display(), "removed orphaned repository directory");
                report.removed.push(path);
            }
            Ok(Removal::AlreadyGone(path)) => {
                tracing::debug!(path = %path.display(), "orphaned repository directory already gone");
                report.already_gone.push(path);
            }
            Err(err) => {
                let path = match &err {
                    CleanerError::Delete { path, .. } => path.clone(),
                    _ => orphan_path(home, name),
                };
                tracing::warn!(
                    operation = err.operation(),
                    path = %path.display(),
                    error = %err,
                    "cleaner failed to remove orphaned repository directory",
                );
                report.failed.push(DeleteFailure {
                    path,
                    error: err.to_string(),
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;
    use std::sync::{mpsc, Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;

    fn make_repo(home: &Path, name: &str) -> PathBuf {
        let path = home.join(name);
        fs::create_dir_all(path.join("refs").join("heads")).expect("mkdir");
        fs::write(path.join("HEAD"), "ref: refs/heads/main\n").expect("write");
        path
    }

    #[test]
    fn removes_nested_repository() {
        let home = TempDir::new().expect("home");
        let repo = make_repo(home.path(), "gone.git");

        let removal = remove_orphan(home.path(), "gone", &RepoLock::new()).expect("remove");
        assert_eq!(removal, Removal::Removed(repo.clone()));
        assert!(!repo.exists());
    }

    #[test]
    fn missing_directory_is_already_gone() {
        let home = TempDir::new().expect("home");
        let removal = remove_orphan(home.path(), "ghost", &RepoLock::new()).expect("remove");
        assert!(matches!(removal, Removal::AlreadyGone(_)));
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let home = TempDir::new().expect("home");
        let first = make_repo(home.path(), "first.git");
        let last = make_repo(home.path(), "last.git");
        let lock = RepoLock::new();

        // An interior NUL byte can never be a valid path, so this removal fails.
        let names = vec!["first".to_string(), "bad\0name".to_string(), "last".to_string()];
        let report = remove_orphans(home.path(), &names, &lock);

        assert_eq!(report.removed, vec![first.clone(), last.clone()]);
        assert_eq!(report.failed.len(), 1);
        assert!(!first.exists());
        assert!(!last.exists());
        assert!(lock.try_lock().is_some(), "lock must be released after a failure");
    }

    #[test]
    fn removal_waits_for_external_holder() {
        let home = TempDir::new().expect("home");
        let repo = make_repo(home.path(), "busy.git");
        let lock = RepoLock::new();

        let held = lock.lock();
        let (done_tx, done_rx) = mpsc::channel();
        let worker = {
            let lock = lock.clone();
            let home = home.path().to_path_buf();
            thread::spawn(move || {
                let removal = remove_orphan(&home, "busy", &lock);
                done_tx.send(()).expect("signal");
                removal
            })
        };

        assert!(
            done_rx.recv_timeout(Duration::from_millis(200)).is_err(),
            "removal must block while the lock is held"
        );
        assert!(repo.exists(), "directory must survive while the lock is held");

        drop(held);
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("removal should finish once the lock is released");
        let removal = worker.join().expect("join").expect("remove");
        assert_eq!(removal, Removal::Removed(repo.clone()));
        assert!(!repo.exists());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_removal_logs_operation_path_and_cause() {
        let home = TempDir::new().expect("home");
        let logs = CapturedLogs::default();
        let subscriber = {
            let sink = logs.clone();
            tracing_subscriber::fmt()
                .json()
                .with_writer(move || sink.clone())
                .finish()
        };

        let names = vec!["bad\0name".to_string()];
        let report = tracing::subscriber::with_default(subscriber, || {
            remove_orphans(home.path(), &names, &RepoLock::new())
        });
        assert_eq!(report.failed.len(), 1);

        let bytes = logs.0.lock().expect("log buffer").clone();
        let fields: Vec<serde_json::Value> = String::from_utf8_lossy(&bytes)
            .lines()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .map(|event| event["fields"].clone())
            .filter(|fields| fields["operation"] == "delete")
            .collect();
        assert_eq!(fields.len(), 1, "expected one delete failure event");
        assert!(fields[0]["path"].as_str().unwrap_or_default().contains("name.git"));
        assert!(fields[0]["error"]
            .as_str()
            .unwrap_or_default()
            .contains("error removing deleted app"));
    }
}
