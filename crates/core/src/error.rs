//! Error types for the Cartmanify domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`TransformError`] is the
//! taxonomy surfaced at the system boundary.

use thiserror::Error;

/// Failures reported by a completion provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Input rejected before the completion service is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Text is required")]
    EmptyText,

    #[error("Invalid sensor level. Must be: mild, medium, or raw")]
    InvalidSensorLevel(String),

    #[error("Text is too long. Maximum length is {max} characters.")]
    TextTooLong { max: usize, actual: usize },
}

/// The classified failure of one transform.
///
/// `Display` yields the user-facing message; [`TransformError::status_code`]
/// yields the HTTP-style status returned at the boundary.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid API key. Please check your OpenAI API key.")]
    UpstreamAuth,

    #[error("Rate limit exceeded. Please try again later.")]
    UpstreamRateLimited,

    /// `detail` is for logs only and never shown to the caller.
    #[error("Failed to transform text. Please try again.")]
    Upstream { detail: String },
}

impl TransformError {
    /// Build a generic upstream failure from anything displayable.
    pub fn upstream(detail: impl std::fmt::Display) -> Self {
        Self::Upstream {
            detail: detail.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::UpstreamAuth => 401,
            Self::UpstreamRateLimited => 429,
            Self::Upstream { .. } => 500,
        }
    }

    /// Whether a user-triggered retry can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamRateLimited | Self::Upstream { .. })
    }
}

/// Failures of the client-side key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
