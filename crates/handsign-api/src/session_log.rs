//! Labels detected on the live stream.

use std::collections::VecDeque;

use handsign_models::collapse_adjacent;
use tokio::sync::RwLock;
use tracing::debug;

/// Bounded, append-only record of stream detections.
///
/// Shared by every stream connection. Appends are serialized by the lock, and
/// once `capacity` entries are held the oldest entry is dropped for each new
/// one.
#[derive(Debug)]
pub struct SessionLog {
    entries: RwLock<VecDeque<String>>,
    capacity: usize,
}

impl SessionLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn append(&self, label: impl Into<String>) {
        self.extend([label.into()]).await;
    }

    /// Append several labels under one lock so they stay contiguous.
    pub async fn extend<I>(&self, labels: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries = self.entries.write().await;
        let mut evicted = 0;
        for label in labels {
            if entries.len() == self.capacity {
                entries.pop_front();
                evicted += 1;
            }
            entries.push_back(label);
        }
        if evicted > 0 {
            debug!(evicted, capacity = self.capacity, "Session log full, dropped oldest entries");
        }
    }

    /// Every retained entry, oldest first.
    pub async fn snapshot(&self) -> Vec<String> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Retained entries with runs of the same label collapsed to one.
    pub async fn collapsed(&self) -> Vec<String> {
        collapse_adjacent(self.entries.read().await.iter())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new(1000)
    }
}
