//! `cartmanify transform`: one-shot transform.

use cartmanify_core::store::{HistoryStore, PreferenceStore};
use cartmanify_core::transform::{TransformHistoryItem, TransformRequest, Transformer};
use cartmanify_pipeline::TransformPipeline;
use tracing::warn;

use super::{CommandResult, load_config, open_stores, require_api_key};

pub async fn run(text: String, level: Option<String>) -> CommandResult {
    let config = load_config()?;
    require_api_key(&config)?;
    let stores = open_stores(&config).await?;

    let sensor_level = match level {
        Some(level) => level,
        None => stores
            .preferences
            .load_sensor_level()
            .await?
            .unwrap_or_default()
            .as_str()
            .to_string(),
    };

    let provider = cartmanify_providers::build_from_config(&config);
    let pipeline = TransformPipeline::from_config(provider, &config);

    let request = TransformRequest {
        text,
        sensor_level,
        character: None,
    };

    eprint!("  Thinking...");
    let outcome = pipeline.transform(request).await;
    eprint!("\r              \r");

    let result = outcome.map_err(|e| e.to_string())?;
    match result.emotion {
        Some(emotion) => println!("({emotion}) {}", result.transformed_text),
        None => println!("{}", result.transformed_text),
    }

    if let Err(e) = stores
        .history
        .push(TransformHistoryItem::from_result(&result))
        .await
    {
        warn!(error = %e, "Failed to record transform history");
    }

    Ok(())
}
