//! The transform pipeline: a validated request goes through exactly one
//! completion call. Retrying is left to the session.

use std::sync::Arc;

use async_trait::async_trait;
use cartmanify_core::{
    Provider, ProviderRequest, SensorLevel, TransformError, TransformRequest, TransformResult,
    Transformer, ValidationError,
};
use tracing::{debug, info};

use crate::classifier::classify;
use crate::parser::parse;
use crate::prompt::PromptComposer;

/// Sampling temperature for every completion.
pub const SAMPLING_TEMPERATURE: f32 = 0.8;

/// Output-length ceiling for every completion, in tokens.
pub const MAX_COMPLETION_TOKENS: u32 = 500;

/// Orchestrates validation, prompt composition, completion and parsing.
pub struct TransformPipeline {
    provider: Arc<dyn Provider>,
    model: String,
    composer: PromptComposer,
    max_input_chars: Option<usize>,
}

impl TransformPipeline {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            composer: PromptComposer::default(),
            max_input_chars: None,
        }
    }

    /// Build a pipeline using the model and transform settings from config.
    pub fn from_config(provider: Arc<dyn Provider>, config: &cartmanify_config::AppConfig) -> Self {
        Self::new(provider, &config.default_model)
            .with_emotion_tags(config.transform.emotion_tags)
            .with_max_input_chars(config.transform.max_input_chars)
    }

    /// Cap input length in characters. `0` disables the cap.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = (max > 0).then_some(max);
        self
    }

    pub fn with_emotion_tags(mut self, enabled: bool) -> Self {
        self.composer = PromptComposer::new(enabled);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn validate(&self, request: &TransformRequest) -> Result<SensorLevel, ValidationError> {
        if request.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let level: SensorLevel = request.sensor_level.parse()?;

        if let Some(max) = self.max_input_chars {
            let actual = request.text.chars().count();
            if actual > max {
                return Err(ValidationError::TextTooLong { max, actual });
            }
        }

        Ok(level)
    }

    pub async fn run(&self, request: TransformRequest) -> Result<TransformResult, TransformError> {
        let level = self.validate(&request)?;

        if let Some(character) = &request.character {
            debug!(character = %character, "Ignoring reserved character field");
        }

        let prompt = self.composer.compose(&request.text, level);
        let provider_request = ProviderRequest {
            model: self.model.clone(),
            messages: prompt.messages(),
            temperature: SAMPLING_TEMPERATURE,
            max_tokens: Some(MAX_COMPLETION_TOKENS),
        };

        debug!(
            provider = %self.provider.name(),
            model = %self.model,
            sensor_level = %level,
            input_chars = request.text.chars().count(),
            "Running transform"
        );

        let response = self
            .provider
            .complete(provider_request)
            .await
            .map_err(classify)?;

        let raw = response.message.content;
        let (transformed_text, emotion) = if self.composer.emotion_tags() {
            let parsed = parse(&raw);
            (parsed.cleaned_text, Some(parsed.emotion))
        } else {
            (raw, None)
        };

        info!(
            model = %response.model,
            sensor_level = %level,
            emotion = emotion.map(|e| e.as_str()).unwrap_or("none"),
            tokens = response.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0),
            "Transform complete"
        );

        Ok(TransformResult {
            transformed_text,
            original_text: request.text,
            sensor_level: level,
            emotion,
        })
    }
}

#[async_trait]
impl Transformer for TransformPipeline {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResult, TransformError> {
        self.run(request).await
    }
}
