//! Bounded transform history persisted under a fixed key.

use async_trait::async_trait;
use cartmanify_core::error::StoreError;
use cartmanify_core::store::{HistoryStore, KeyValueStore};
use cartmanify_core::transform::TransformHistoryItem;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Key under which the history list is stored.
pub const HISTORY_KEY: &str = "cartmanify_history";

/// Default number of entries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Most-recent-first, fixed-capacity history.
///
/// The deque is the source of truth while the process runs; every mutation
/// is written back to the key-value store as a JSON array, and only applied
/// in memory once that write succeeds.
pub struct HistoryLog {
    store: Arc<dyn KeyValueStore>,
    capacity: usize,
    items: RwLock<VecDeque<TransformHistoryItem>>,
}

impl HistoryLog {
    /// Load the history from `store`. Unreadable content starts empty.
    pub async fn load(store: Arc<dyn KeyValueStore>, capacity: usize) -> Result<Self, StoreError> {
        let capacity = capacity.max(1);
        let mut items: VecDeque<TransformHistoryItem> = match store.get(HISTORY_KEY).await? {
            Some(raw) => match serde_json::from_str::<Vec<TransformHistoryItem>>(&raw) {
                Ok(list) => list.into(),
                Err(e) => {
                    warn!(store = store.name(), error = %e, "Ignoring unreadable history");
                    VecDeque::new()
                }
            },
            None => VecDeque::new(),
        };
        items.truncate(capacity);

        Ok(Self {
            store,
            capacity,
            items: RwLock::new(items),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    async fn save(&self, items: &VecDeque<TransformHistoryItem>) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;
        self.store.set(HISTORY_KEY, json).await
    }
}

#[async_trait]
impl HistoryStore for HistoryLog {
    async fn push(&self, item: TransformHistoryItem) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let mut updated = items.clone();
        updated.push_front(item);
        updated.truncate(self.capacity);
        self.save(&updated).await?;
        *items = updated;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<TransformHistoryItem>, StoreError> {
        Ok(self.items.read().await.iter().cloned().collect())
    }

    async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        let mut updated = items.clone();
        updated.retain(|item| item.id != id);
        if updated.len() == items.len() {
            return Ok(false);
        }
        self.save(&updated).await?;
        *items = updated;
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        self.store.remove(HISTORY_KEY).await?;
        items.clear();
        Ok(())
    }
}
