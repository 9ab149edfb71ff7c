//! `cartmanify history`: list or clear persisted transforms.

use cartmanify_core::store::HistoryStore;

use super::{CommandResult, load_config, open_stores};

pub async fn run(clear: bool) -> CommandResult {
    let config = load_config()?;
    let stores = open_stores(&config).await?;

    if clear {
        stores.history.clear().await?;
        println!("History cleared.");
        return Ok(());
    }

    let items = stores.history.list().await?;
    if items.is_empty() {
        println!("No transforms yet.");
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        println!(
            "{:>2}. [{}] {}  ({})",
            i + 1,
            item.sensor_level,
            item.original_text,
            item.timestamp.format("%Y-%m-%d %H:%M")
        );
        println!("    -> {}", item.transformed_text);
    }

    Ok(())
}
