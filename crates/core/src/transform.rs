//! Transform domain types: sensor levels, emotions, requests, results.
//!
//! A *transform* is one request/response cycle that rewrites the caller's
//! text in the persona's voice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TransformError, ValidationError};

/// How strongly profanity is masked in generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorLevel {
    /// Fully censor or avoid profanity.
    Mild,
    /// Partial masking.
    #[default]
    Medium,
    /// Unmasked.
    Raw,
}

impl SensorLevel {
    pub const ALL: [SensorLevel; 3] = [Self::Mild, Self::Medium, Self::Raw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Medium => "medium",
            Self::Raw => "raw",
        }
    }
}

impl FromStr for SensorLevel {
    type Err = ValidationError;

    /// Exact, lowercase literals only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mild" => Ok(Self::Mild),
            "medium" => Ok(Self::Medium),
            "raw" => Ok(Self::Raw),
            other => Err(ValidationError::InvalidSensorLevel(other.to_string())),
        }
    }
}

impl fmt::Display for SensorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persona's simulated emotional state for one reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Laughing,
    Surprised,
    Angry,
    Sad,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Self::Neutral,
        Self::Laughing,
        Self::Surprised,
        Self::Angry,
        Self::Sad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Laughing => "laughing",
            Self::Surprised => "surprised",
            Self::Angry => "angry",
            Self::Sad => "sad",
        }
    }

    /// Case-sensitive lookup by textual name. Unknown names yield `None`;
    /// callers fall back to [`Emotion::Neutral`].
    pub fn from_tag(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transform request as received from a caller.
///
/// `sensor_level` is kept as the caller's raw string: validation into a
/// [`SensorLevel`] is the pipeline's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub text: String,

    pub sensor_level: String,

    /// Reserved for persona selection; ignored by the current pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
}

impl TransformRequest {
    pub fn new(text: impl Into<String>, level: SensorLevel) -> Self {
        Self {
            text: text.into(),
            sensor_level: level.as_str().to_string(),
            character: None,
        }
    }
}

/// The outcome of one successful transform. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// The persona reply with any emotion tag stripped.
    pub transformed_text: String,
    pub original_text: String,
    pub sensor_level: SensorLevel,
    /// `None` when emotion tagging is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
}

/// One entry of the bounded transform history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformHistoryItem {
    pub id: String,
    #[serde(rename = "original")]
    pub original_text: String,
    #[serde(rename = "transformed")]
    pub transformed_text: String,
    pub sensor_level: SensorLevel,
    pub timestamp: DateTime<Utc>,
}

impl TransformHistoryItem {
    pub fn from_result(result: &TransformResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original_text: result.original_text.clone(),
            transformed_text: result.transformed_text.clone(),
            sensor_level: result.sensor_level,
            timestamp: Utc::now(),
        }
    }
}

/// Anything that can run one transform cycle.
///
/// Implemented by the local pipeline and by the HTTP client for a remote
/// gateway, so the session orchestrator does not care which one it drives.
#[async_trait]
pub trait Transformer: Send + Sync {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResult, TransformError>;
}
