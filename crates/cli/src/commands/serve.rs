//! `cartmanify serve`: start the HTTP gateway.

use super::{CommandResult, load_config};

pub async fn run(port_override: Option<u16>) -> CommandResult {
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Cartmanify Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.default_model);
    println!("   Origin:    {}", config.gateway.allowed_origin);

    cartmanify_gateway::start(config).await?;

    Ok(())
}
