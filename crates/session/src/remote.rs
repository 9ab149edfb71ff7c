//! A [`Transformer`] backed by a remote Cartmanify gateway.

use async_trait::async_trait;
use cartmanify_core::error::{TransformError, ValidationError};
use cartmanify_core::transform::{TransformRequest, TransformResult, Transformer};
use cartmanify_core::wire::{ErrorBody, TransformBody, TransformResponse};
use std::time::Duration;
use tracing::{debug, warn};

/// Posts transform requests to `{base_url}/transform`.
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Rebuild the validation error a gateway reported as a 400.
fn validation_from_message(message: &str, request: &TransformRequest) -> TransformError {
    if message == ValidationError::EmptyText.to_string() {
        return ValidationError::EmptyText.into();
    }
    if message.starts_with("Invalid sensor level") {
        return ValidationError::InvalidSensorLevel(request.sensor_level.clone()).into();
    }
    if message.starts_with("Text is too long") {
        let max = message
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|digits| digits.parse().ok())
            .unwrap_or_default();
        return ValidationError::TextTooLong {
            max,
            actual: request.text.chars().count(),
        }
        .into();
    }
    TransformError::upstream(format!("gateway rejected request: {message}"))
}

#[async_trait]
impl Transformer for GatewayClient {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResult, TransformError> {
        let url = format!("{}/transform", self.base_url);
        let body = TransformBody {
            text: Some(request.text.clone()),
            sensor_level: Some(request.sensor_level.clone()),
            character: request.character.clone(),
        };

        debug!(url = %url, sensor_level = %request.sensor_level, "Sending remote transform");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransformError::upstream(format!("gateway unreachable: {e}")))?;

        let status = response.status().as_u16();
        if status == 200 {
            let body: TransformResponse = response
                .json()
                .await
                .map_err(|e| TransformError::upstream(format!("malformed gateway reply: {e}")))?;
            return Ok(body.into());
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_default();
        warn!(status, error = %message, "Gateway returned an error");

        Err(match status {
            400 => validation_from_message(&message, &request),
            401 => TransformError::UpstreamAuth,
            429 => TransformError::UpstreamRateLimited,
            _ => TransformError::upstream(format!("gateway status {status}: {message}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = GatewayClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn validation_messages_round_trip() {
        let request = TransformRequest {
            text: "a".repeat(600),
            sensor_level: "loud".into(),
            character: None,
        };

        assert!(matches!(
            validation_from_message("Text is required", &request),
            TransformError::Validation(ValidationError::EmptyText)
        ));
        assert!(matches!(
            validation_from_message("Invalid sensor level. Must be: mild, medium, or raw", &request),
            TransformError::Validation(ValidationError::InvalidSensorLevel(level)) if level == "loud"
        ));
        assert!(matches!(
            validation_from_message("Text is too long. Maximum length is 500 characters.", &request),
            TransformError::Validation(ValidationError::TextTooLong { max: 500, actual: 600 })
        ));
        assert!(matches!(
            validation_from_message("Invalid request body", &request),
            TransformError::Upstream { .. }
        ));
    }
}
