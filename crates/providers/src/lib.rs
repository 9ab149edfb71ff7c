//! Completion provider implementations for Cartmanify.
//!
//! All providers implement the `cartmanify_core::Provider` trait.
//! [`build_from_config`] selects and builds the configured one.

pub mod openai_compat;

use std::sync::Arc;

use cartmanify_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the default provider from configuration.
///
/// The provider-specific key wins over the top-level `api_key`; the
/// provider-specific `api_url` wins over the well-known base URL.
pub fn build_from_config(config: &cartmanify_config::AppConfig) -> Arc<dyn Provider> {
    let name = config.default_provider.as_str();
    let provider_config = config.providers.get(name);

    let api_key = provider_config
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();

    let base_url = provider_config
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(name).to_string());

    tracing::debug!(provider = %name, base_url = %base_url, "Building completion provider");

    Arc::new(OpenAiCompatProvider::new(name, base_url, api_key))
}

/// Get the default base URL for a known provider name.
fn default_base_url(provider: &str) -> &'static str {
    match provider {
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        _ => "https://api.openai.com/v1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartmanify_config::{AppConfig, ProviderConfig};

    #[test]
    fn default_config_builds_openai() {
        let provider = build_from_config(&AppConfig::default());
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn unknown_provider_falls_back_to_openai_url() {
        assert_eq!(default_base_url("mystery"), "https://api.openai.com/v1");
        assert_eq!(default_base_url("ollama"), "http://localhost:11434/v1");
    }

    #[test]
    fn provider_section_is_used() {
        let mut config = AppConfig {
            default_provider: "ollama".into(),
            ..AppConfig::default()
        };
        config.providers.insert(
            "ollama".into(),
            ProviderConfig {
                api_key: None,
                api_url: Some("http://gpu-box:11434/v1".into()),
            },
        );
        let provider = build_from_config(&config);
        assert_eq!(provider.name(), "ollama");
    }
}
