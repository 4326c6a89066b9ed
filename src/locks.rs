//! Named async locks shared across concurrent resolutions

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of named mutexes; the same name always yields the same mutex
#[derive(Default, Clone)]
pub struct LockRegistry {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the mutex registered under `name`
    pub fn get(&self, name: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Acquire the lock registered under `name`, waiting if it is held
    pub async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let mutex = self.get(name);
        if let Ok(guard) = mutex.clone().try_lock_owned() {
            return guard;
        }
        tracing::debug!(lock = name, "waiting for lock");
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_mutex() {
        let locks = LockRegistry::new();
        assert!(Arc::ptr_eq(&locks.get("a"), &locks.get("a")));
        assert!(!Arc::ptr_eq(&locks.get("a"), &locks.get("b")));
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let locks = LockRegistry::new();
        let guard = locks.lock("catalogue").await;

        assert!(locks.get("catalogue").try_lock().is_err());
        assert!(locks.get("other").try_lock().is_ok());

        drop(guard);
        assert!(locks.get("catalogue").try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_locks() {
        let locks = LockRegistry::new();
        let clone = locks.clone();
        let _guard = locks.lock("shared").await;
        assert!(clone.get("shared").try_lock().is_err());
    }
}
