//! Run-level lock.
//!
//! Runs over the same store take this lock for their whole duration, so
//! one run's reads never see another run's half-written outputs. There is
//! one lock per store in the process, however many repositories or
//! pipelines wrap it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, OnceLock, PoisonError, Weak};

use propcash_core::types::Date;
use propcash_traits::TableStore;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

type Registry = StdMutex<HashMap<usize, Weak<Mutex<()>>>>;

fn registry() -> &'static Registry {
    static LOCKS: OnceLock<Registry> = OnceLock::new();
    LOCKS.get_or_init(Registry::default)
}

/// Serializes pipeline runs sharing a store.
#[derive(Debug, Clone, Default)]
pub struct RunLock {
    inner: Arc<Mutex<()>>,
}

/// Held while a run is in progress.
#[derive(Debug)]
pub struct RunGuard {
    _guard: OwnedMutexGuard<()>,
}

impl RunLock {
    /// Creates an unlocked lock not tied to any store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock shared by every handle to `store` in this process.
    #[must_use]
    pub fn for_store(store: &Arc<dyn TableStore>) -> Self {
        let key = Arc::as_ptr(store).cast::<()>() as usize;
        let mut locks = registry().lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| lock.strong_count() > 0);
        let inner = match locks.get(&key).and_then(Weak::upgrade) {
            Some(inner) => inner,
            None => {
                let inner = Arc::new(Mutex::new(()));
                locks.insert(key, Arc::downgrade(&inner));
                inner
            }
        };
        Self { inner }
    }

    /// Waits for any other run to finish, then holds the lock.
    pub async fn acquire(&self, as_at: Date) -> RunGuard {
        if let Ok(guard) = Arc::clone(&self.inner).try_lock_owned() {
            return RunGuard { _guard: guard };
        }
        debug!(%as_at, "waiting for run in progress");
        RunGuard {
            _guard: Arc::clone(&self.inner).lock_owned().await,
        }
    }

    /// Whether a run currently holds the lock.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use propcash_ext_redb::RedbTableStore;

    #[tokio::test]
    async fn test_second_run_waits() {
        let lock = RunLock::new();
        let as_at = Date::from_ymd(2025, 6, 30).unwrap();
        let guard = lock.acquire(as_at).await;
        assert!(lock.is_held());

        let other = lock.clone();
        let waiter = tokio::spawn(async move {
            let _g = other.acquire(as_at).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert!(!lock.is_held());
    }

    #[tokio::test]
    async fn test_one_lock_per_store() {
        let store: Arc<dyn TableStore> = Arc::new(RedbTableStore::in_memory().unwrap());
        let other: Arc<dyn TableStore> = Arc::new(RedbTableStore::in_memory().unwrap());
        let as_at = Date::from_ymd(2025, 6, 30).unwrap();

        let first = RunLock::for_store(&store);
        let second = RunLock::for_store(&Arc::clone(&store));
        let unrelated = RunLock::for_store(&other);

        let _guard = first.acquire(as_at).await;
        assert!(second.is_held());
        assert!(!unrelated.is_held());
    }
}
