//! Maps provider failures onto the boundary error taxonomy.

use cartmanify_core::{ProviderError, TransformError};

/// Classify a provider failure. Pure: no retries, no logging.
pub fn classify(err: ProviderError) -> TransformError {
    match err {
        ProviderError::AuthenticationFailed(_) => TransformError::UpstreamAuth,
        ProviderError::ApiError {
            status_code: 401, ..
        } => TransformError::UpstreamAuth,
        ProviderError::RateLimited { .. } => TransformError::UpstreamRateLimited,
        ProviderError::ApiError {
            status_code: 429, ..
        } => TransformError::UpstreamRateLimited,
        other => TransformError::upstream(other),
    }
}
