//! Process-wide repository lock.
//!
//! One [`RepoLock`] is built at startup and cloned into every subsystem that
//! creates, writes or removes directories under the git home (the cleaner,
//! the push pipeline). Clones share the same underlying mutex.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

/// Cloneable mutual-exclusion handle over the git home directory tree.
#[derive(Debug, Clone, Default)]
pub struct RepoLock {
    inner: Arc<Mutex<()>>,
}

/// Held while a subsystem mutates the git home. Releases on drop.
#[derive(Debug)]
#[must_use = "the repository lock is released as soon as the guard is dropped"]
pub struct RepoLockGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl RepoLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is free.
    ///
    /// A holder that panicked does not wedge the lock: the mutex guards no
    /// data, so poisoning is ignored and acquisition proceeds.
    pub fn lock(&self) -> RepoLockGuard<'_> {
        let guard = self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("repository lock was poisoned by a panicking holder; recovering");
            poisoned.into_inner()
        });
        RepoLockGuard { _guard: guard }
    }

    /// Acquire without blocking; `None` when another holder has it.
    pub fn try_lock(&self) -> Option<RepoLockGuard<'_>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(RepoLockGuard { _guard: guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(RepoLockGuard {
                _guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn clones_share_one_mutex() {
        let lock = RepoLock::new();
        let clone = lock.clone();
        let _held = lock.lock();
        assert!(clone.try_lock().is_none(), "clone must observe the held lock");
        assert!(RepoLock::new().try_lock().is_some(), "separate locks are independent");
    }

    #[test]
    fn guard_drop_releases() {
        let lock = RepoLock::new();
        {
            let _held = lock.lock();
        }
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let lock = RepoLock::new();
        let clone = lock.clone();
        let _ = thread::spawn(move || {
            let _held = clone.lock();
            panic!("holder panics");
        })
        .join();

        let _held = lock.lock();
        assert!(lock.try_lock().is_none());
    }
}
