//! Per-key serialization of migrations
//!
//! Two migrations of the same configuration never run at the same time:
//! the second caller waits until the first has finished and then runs
//! against its own input. Different keys proceed independently.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// At-most-one-in-flight guard keyed by configuration key
#[derive(Debug, Default)]
pub struct MigrationCoordinator {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl MigrationCoordinator {
    /// Create an empty coordinator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` once no other task is running for `key`
    pub async fn run<F, Fut, T>(&self, key: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lock = Arc::clone(
            self.locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        let result = {
            let _guard = lock.lock().await;
            debug!(key, "Migration started");
            f().await
        };

        // The map and this task are the only holders once nobody waits
        self.locks
            .remove_if(key, |_, held| Arc::strong_count(held) <= 2);
        result
    }

    /// Keys with a migration running or queued
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}
