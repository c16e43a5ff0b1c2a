//! Per-partition serialization
//!
//! Writers for the same partition (batch commit, approval) queue on one async
//! mutex; different partitions never contend. Guards are only held around
//! database phases, never across the engine call.

use std::collections::HashMap;
use std::sync::Arc;
use timetable_common::PartitionKey;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of partition mutexes
#[derive(Clone, Default)]
pub struct PartitionLocks {
    inner: Arc<Mutex<HashMap<PartitionKey, Arc<Mutex<()>>>>>,
}

impl PartitionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a partition
    pub async fn acquire(&self, partition: &PartitionKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.inner.lock().await;
            // Drop entries nobody holds or waits on
            registry.retain(|key, lock| key == partition || Arc::strong_count(lock) > 1);
            registry
                .entry(partition.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    /// Number of partitions currently tracked
    pub async fn tracked(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn key(semester: &str) -> PartitionKey {
        PartitionKey::new("org1", "btech", "2", semester).unwrap()
    }

    #[tokio::test]
    async fn test_same_partition_is_exclusive() {
        let locks = PartitionLocks::new();
        let guard = locks.acquire(&key("1")).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&key("1")).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender should acquire after release")
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_partitions_do_not_block() {
        let locks = PartitionLocks::new();
        let _first = locks.acquire(&key("1")).await;

        let second = tokio::time::timeout(Duration::from_millis(200), locks.acquire(&key("2"))).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = PartitionLocks::new();
        drop(locks.acquire(&key("1")).await);
        drop(locks.acquire(&key("2")).await);

        let _guard = locks.acquire(&key("3")).await;
        assert_eq!(locks.tracked().await, 1);
    }
}
