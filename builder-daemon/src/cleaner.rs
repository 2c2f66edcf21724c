//! Periodic orphaned-repository cleaner task.
//!
//! Every poll interval the task runs one [`builder_cleaner::cycle`] on the
//! blocking pool. List and scan failures are logged and retried on the next
//! tick; the task sleeps after every cycle regardless of its outcome. The
//! stop signal is checked before each cycle and races the sleep, so shutdown
//! never waits for a full interval.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use builder_cleaner::{cycle, CleanerError, CycleReport, NamespaceSource, RepoLock};
use builder_core::CleanerConfig;

use crate::error::DaemonError;
use crate::health::{CleanerStatus, HealthTracker};

/// Runtime parameters for the cleaner task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerSettings {
    pub git_home: PathBuf,
    pub poll_interval: Duration,
    pub failure_threshold: u32,
}

impl From<&CleanerConfig> for CleanerSettings {
    fn from(config: &CleanerConfig) -> Self {
        Self {
            git_home: config.git_home.clone(),
            poll_interval: config.poll_interval(),
            failure_threshold: config.failure_threshold,
        }
    }
}

/// Owner of a running cleaner task.
///
/// Dropping the handle signals the task to stop at its next check; use
/// [`CleanerHandle::stop`] to also wait for it to exit.
pub struct CleanerHandle {
    shutdown_tx: broadcast::Sender<()>,
    status_rx: watch::Receiver<CleanerStatus>,
    task: Option<JoinHandle<Result<(), DaemonError>>>,
}

impl CleanerHandle {
    /// Latest published status.
    pub fn status(&self) -> CleanerStatus {
        self.status_rx.borrow().clone()
    }

    /// Receiver notified after every completed cycle.
    pub fn subscribe(&self) -> watch::Receiver<CleanerStatus> {
        self.status_rx.clone()
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(mut self) -> Result<(), DaemonError> {
        let _ = self.shutdown_tx.send(());
        self.join().await
    }

    /// Wait for the task to exit on its own (daemon-wide shutdown).
    pub async fn wait(mut self) -> Result<(), DaemonError> {
        self.join().await
    }

    async fn join(&mut self) -> Result<(), DaemonError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        match task.await {
            Ok(result) => result,
            Err(err) => Err(DaemonError::Task(format!("cleaner task join failure: {err}"))),
        }
    }
}

impl Drop for CleanerHandle {
    fn drop(&mut self) {
        // The task keeps its own sender for the exit broadcast, so the
        // channel never closes on its own; stop it explicitly.
        let _ = self.shutdown_tx.send(());
    }
}

/// Spawn the cleaner with its own stop channel.
pub fn spawn(
    settings: CleanerSettings,
    source: Arc<dyn NamespaceSource>,
    lock: RepoLock,
) -> CleanerHandle {
    let (shutdown_tx, _) = broadcast::channel::<()>(16);
    spawn_with_shutdown(settings, source, lock, shutdown_tx)
}

/// Spawn the cleaner on a shared daemon-wide shutdown channel.
///
/// The task broadcasts on `shutdown` when it exits so sibling tasks follow it.
pub fn spawn_with_shutdown(
    settings: CleanerSettings,
    source: Arc<dyn NamespaceSource>,
    lock: RepoLock,
    shutdown: broadcast::Sender<()>,
) -> CleanerHandle {
    let (status_tx, status_rx) = watch::channel(CleanerStatus::default());
    let shutdown_rx = shutdown.subscribe();
    let task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = cleaner_task(settings, source, lock, status_tx, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };
    CleanerHandle {
        shutdown_tx: shutdown,
        status_rx,
        task: Some(task),
    }
}

async fn cleaner_task(
    settings: CleanerSettings,
    source: Arc<dyn NamespaceSource>,
    lock: RepoLock,
    status_tx: watch::Sender<CleanerStatus>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut health = HealthTracker::new(settings.failure_threshold);
    tracing::info!(
        git_home = %settings.git_home.display(),
        poll_interval_ms = settings.poll_interval.as_millis() as u64,
        "cleaner started",
    );

    loop {
        match shutdown_rx.try_recv() {
            Err(TryRecvError::Empty) => {}
            _ => break,
        }

        match run_cycle(&settings, source.clone(), lock.clone()).await {
            Ok(report) => {
                if !report.is_clean() {
                    tracing::info!(
                        orphans = report.orphans.len(),
                        removed = report.removed.len(),
                        failed = report.failed.len(),
                        duration_ms = report.duration_ms as u64,
                        "cleaner cycle completed",
                    );
                }
                health.record_success(&report);
            }
            Err(CycleFailure::Cleaner(err)) => {
                tracing::warn!(operation = err.operation(), error = %err, "cleaner cycle aborted");
                health.record_failure(err.to_string());
            }
            Err(CycleFailure::Panicked(msg)) => {
                tracing::error!(error = %msg, "cleaner cycle panicked");
                health.record_failure(msg);
            }
        }
        status_tx.send_replace(health.status().clone());

        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(settings.poll_interval) => {}
        }
    }

    tracing::info!("cleaner stopped");
    Ok(())
}

enum CycleFailure {
    Cleaner(CleanerError),
    Panicked(String),
}

async fn run_cycle(
    settings: &CleanerSettings,
    source: Arc<dyn NamespaceSource>,
    lock: RepoLock,
) -> Result<CycleReport, CycleFailure> {
    let home = settings.git_home.clone();
    let joined = tokio::task::spawn_blocking(move || {
        cycle::run(&home, source.as_ref(), &lock, false)
    })
    .await;
    match joined {
        Ok(result) => result.map_err(CycleFailure::Cleaner),
        Err(err) => Err(CycleFailure::Panicked(format!("cleaner cycle join error: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let config = CleanerConfig {
            poll_interval_secs: 7,
            failure_threshold: 3,
            ..CleanerConfig::new("/home/git")
        };
        let settings = CleanerSettings::from(&config);
        assert_eq!(settings.git_home, PathBuf::from("/home/git"));
        assert_eq!(settings.poll_interval, Duration::from_secs(7));
        assert_eq!(settings.failure_threshold, 3);
    }
}
