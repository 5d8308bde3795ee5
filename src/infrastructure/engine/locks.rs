//! Per-user mutual exclusion for dispatches

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::state::StateKey;

/// Keyed async locks, one per `(platform, user_id)`.
///
/// An entry lives only while some dispatch holds or waits for it.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<StateKey, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn acquire(&self, key: &StateKey) -> UserLockGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(key.clone()).or_default().clone()
        };

        let guard = lock.lock_owned().await;

        UserLockGuard {
            locks: self,
            key: key.clone(),
            guard: Some(guard),
        }
    }

    /// Number of users currently holding or waiting for a lock
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, key: &StateKey) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(key);
        }
    }
}

/// Held for the duration of one dispatch
#[derive(Debug)]
pub struct UserLockGuard<'a> {
    locks: &'a UserLocks,
    key: StateKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_pruned_after_release() {
        let locks = UserLocks::new();
        let key = StateKey::new("console", "1");

        {
            let _guard = locks.acquire(&key).await;
            assert_eq!(locks.len(), 1);
        }

        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_same_user_is_exclusive() {
        let locks = Arc::new(UserLocks::new());
        let key = StateKey::new("console", "1");

        let guard = locks.acquire(&key).await;

        let waiter = {
            let locks = locks.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&key).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_users_do_not_block() {
        let locks = UserLocks::new();

        let _first = locks.acquire(&StateKey::new("console", "1")).await;
        let _second = locks.acquire(&StateKey::new("console", "2")).await;

        assert_eq!(locks.len(), 2);
    }
}
