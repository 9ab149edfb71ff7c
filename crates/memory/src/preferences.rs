//! Sensor-level preference persisted under a fixed key.

use async_trait::async_trait;
use cartmanify_core::error::StoreError;
use cartmanify_core::store::{KeyValueStore, PreferenceStore};
use cartmanify_core::transform::SensorLevel;
use std::sync::Arc;
use tracing::debug;

/// Key under which the sensor level is stored.
pub const SENSOR_LEVEL_KEY: &str = "cartman_gpt_sensor_level";

pub struct SensorPreference {
    store: Arc<dyn KeyValueStore>,
}

impl SensorPreference {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PreferenceStore for SensorPreference {
    async fn load_sensor_level(&self) -> Result<Option<SensorLevel>, StoreError> {
        let Some(raw) = self.store.get(SENSOR_LEVEL_KEY).await? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(level) => Ok(Some(level)),
            Err(_) => {
                debug!(stored = %raw, "Ignoring invalid stored sensor level");
                Ok(None)
            }
        }
    }

    async fn save_sensor_level(&self, level: SensorLevel) -> Result<(), StoreError> {
        self.store
            .set(SENSOR_LEVEL_KEY, level.as_str().to_string())
            .await
    }
}
