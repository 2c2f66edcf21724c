//! Cleaner health bookkeeping.
//!
//! The cleaner never exits on failure. Instead it counts consecutive failed
//! cycles and reports itself unhealthy once the count reaches the configured
//! threshold, so a host can surface it through its own readiness checks.

use chrono::{DateTime, Utc};
use serde::Serialize;

use builder_cleaner::CycleReport;

/// Snapshot published after every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanerStatus {
    pub healthy: bool,
    pub cycles: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub removed_total: u64,
    pub failed_deletions_total: u64,
}

impl Default for CleanerStatus {
    fn default() -> Self {
        Self {
            healthy: true,
            cycles: 0,
            consecutive_failures: 0,
            last_error: None,
            last_success_at: None,
            removed_total: 0,
            failed_deletions_total: 0,
        }
    }
}

#[derive(Debug)]
pub(crate) struct HealthTracker {
    threshold: u32,
    status: CleanerStatus,
}

impl HealthTracker {
    pub(crate) fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            status: CleanerStatus::default(),
        }
    }

    pub(crate) fn status(&self) -> &CleanerStatus {
        &self.status
    }

    pub(crate) fn record_success(&mut self, report: &CycleReport) {
        let status = &mut self.status;
        status.cycles += 1;
        status.removed_total += report.removed.len() as u64;
        status.failed_deletions_total += report.failed.len() as u64;
        status.last_success_at = Some(Utc::now());
        status.last_error = None;
        if !status.healthy {
            tracing::info!(
                failed_cycles = status.consecutive_failures,
                "cleaner recovered",
            );
        }
        status.consecutive_failures = 0;
        status.healthy = true;
    }

    pub(crate) fn record_failure(&mut self, error: impl Into<String>) {
        let status = &mut self.status;
        status.cycles += 1;
        status.consecutive_failures = status.consecutive_failures.saturating_add(1);
        status.last_error = Some(error.into());
        if status.healthy && status.consecutive_failures >= self.threshold {
            status.healthy = false;
            tracing::error!(
                consecutive_failures = status.consecutive_failures,
                last_error = status.last_error.as_deref().unwrap_or_default(),
                "cleaner is unhealthy",
            );
        }
    }
}
