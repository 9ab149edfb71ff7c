pub mod chat;
pub mod history;
pub mod onboard;
pub mod serve;
pub mod transform;

use std::sync::Arc;

use cartmanify_config::AppConfig;
use cartmanify_core::store::KeyValueStore;
use cartmanify_memory::{FileStore, HistoryLog, SensorPreference};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// The persisted client state under `storage.path`.
pub struct LocalStores {
    pub history: Arc<HistoryLog>,
    pub preferences: Arc<SensorPreference>,
}

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

pub async fn open_stores(config: &AppConfig) -> Result<LocalStores, Box<dyn std::error::Error>> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage.resolved_path()));
    let history = HistoryLog::load(store.clone(), config.storage.history_capacity).await?;
    Ok(LocalStores {
        history: Arc::new(history),
        preferences: Arc::new(SensorPreference::new(store)),
    })
}

/// Fail early with setup instructions when no key is configured.
pub fn require_api_key(config: &AppConfig) -> CommandResult {
    if config.has_api_key() {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    OPENAI_API_KEY=sk-...");
    eprintln!("    CARTMANIFY_API_KEY=sk-...");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}
