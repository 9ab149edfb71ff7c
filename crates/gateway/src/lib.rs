//! HTTP API gateway for Cartmanify.
//!
//! Exposes the transform endpoint (at `/transform` and `/api/transform`)
//! and a health check. Built on Axum.

pub mod error;

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use cartmanify_core::transform::{SensorLevel, TransformRequest, Transformer};
use cartmanify_core::wire::{TransformBody, TransformResponse};
use cartmanify_pipeline::TransformPipeline;

pub use error::ApiError;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub transformer: Arc<dyn Transformer>,
    pub config: cartmanify_config::GatewayConfig,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS restricted to the configured origin
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.allowed_origin);
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route("/transform", post(transform_handler))
        .route("/api/transform", post(transform_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(_) => {
            warn!(origin = %origin, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}

/// Start the gateway HTTP server.
pub async fn start(config: cartmanify_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if !config.has_api_key() {
        warn!("No API key configured; transforms will fail until OPENAI_API_KEY is set");
    }

    let provider = cartmanify_providers::build_from_config(&config);
    let pipeline = TransformPipeline::from_config(provider, &config);

    info!(
        provider = %pipeline.provider_name(),
        model = %pipeline.model(),
        max_input_chars = config.transform.max_input_chars,
        emotion_tags = config.transform.emotion_tags,
        "Transform pipeline ready"
    );

    let state = Arc::new(GatewayState {
        transformer: Arc::new(pipeline),
        config: config.gateway.clone(),
    });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn transform_handler(
    State(state): State<SharedState>,
    payload: Result<Json<TransformBody>, JsonRejection>,
) -> Result<Json<TransformResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Unreadable transform request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
        } else {
            ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body")
        }
    })?;

    let request = TransformRequest {
        text: body.text.unwrap_or_default(),
        sensor_level: body
            .sensor_level
            .unwrap_or_else(|| SensorLevel::default().as_str().to_string()),
        character: body.character,
    };

    let result = state.transformer.transform(request).await?;
    Ok(Json(result.into()))
}
