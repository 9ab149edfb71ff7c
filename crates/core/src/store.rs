//! Client-side persistence traits.
//!
//! Only two things survive a session: the bounded transform history and the
//! sensor-level preference. Both live under fixed keys in a generic string
//! key-value store, loaded on start and saved on every change.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::transform::{SensorLevel, TransformHistoryItem};

/// A generic persistent string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Returns whether the key existed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// Bounded, most-recent-first log of past transforms.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert at the front, evicting the oldest entry when full.
    async fn push(&self, item: TransformHistoryItem) -> Result<(), StoreError>;

    /// All entries, most recent first.
    async fn list(&self) -> Result<Vec<TransformHistoryItem>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<TransformHistoryItem>, StoreError> {
        Ok(self.list().await?.into_iter().find(|item| item.id == id))
    }

    /// Returns whether an entry was removed.
    async fn remove(&self, id: &str) -> Result<bool, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// The persisted sensor-level preference.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// `None` when nothing valid is stored.
    async fn load_sensor_level(&self) -> Result<Option<SensorLevel>, StoreError>;

    async fn save_sensor_level(&self, level: SensorLevel) -> Result<(), StoreError>;
}
