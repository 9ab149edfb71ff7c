//! JSON bodies exchanged with the HTTP gateway.
//!
//! Shared by the gateway (which produces them) and the remote client
//! (which consumes them).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::transform::{Emotion, SensorLevel, TransformResult};

/// Inbound body of `POST /transform`.
///
/// Every field is optional on the wire so that missing text can be
/// reported as a validation error rather than a decode failure. Only an
/// absent `sensorLevel` counts as missing; `null` or a non-string value is
/// kept in its JSON form so that it fails level validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub sensor_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
}

fn present_level<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match Value::deserialize(deserializer)? {
        Value::String(level) => level,
        other => other.to_string(),
    }))
}

/// Successful body of `POST /transform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub transformed: String,
    pub original: String,
    pub sensor_level: SensorLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
}

impl From<TransformResult> for TransformResponse {
    fn from(result: TransformResult) -> Self {
        Self {
            transformed: result.transformed_text,
            original: result.original_text,
            sensor_level: result.sensor_level,
            emotion: result.emotion,
        }
    }
}

impl From<TransformResponse> for TransformResult {
    fn from(body: TransformResponse) -> Self {
        Self {
            transformed_text: body.transformed,
            original_text: body.original,
            sensor_level: body.sensor_level,
            emotion: body.emotion,
        }
    }
}

/// Error body returned for every non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
