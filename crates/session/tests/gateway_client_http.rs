//! The remote gateway client against a local mock gateway.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use cartmanify_core::error::{TransformError, ValidationError};
use cartmanify_core::transform::{Emotion, SensorLevel, TransformRequest, Transformer};
use cartmanify_core::wire::TransformBody;
use cartmanify_session::GatewayClient;
use serde_json::json;

/// Behaviour is selected by the request text.
async fn transform(Json(body): Json<TransformBody>) -> impl IntoResponse {
    let text = body.text.unwrap_or_default();
    let level = body.sensor_level.unwrap_or_else(|| "medium".into());

    let error = |status: StatusCode, message: &str| {
        (status, Json(json!({ "error": message }))).into_response()
    };

    match text.as_str() {
        "" => error(StatusCode::BAD_REQUEST, "Text is required"),
        "bad-key" => error(
            StatusCode::UNAUTHORIZED,
            "Invalid API key. Please check your OpenAI API key.",
        ),
        "limited" => error(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.",
        ),
        "boom" => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to transform text. Please try again.",
        ),
        "garbage" => "definitely not json".into_response(),
        _ if level == "loud" => error(
            StatusCode::BAD_REQUEST,
            "Invalid sensor level. Must be: mild, medium, or raw",
        ),
        _ => Json(json!({
            "transformed": format!("Screw you guys, {text}"),
            "original": text.clone(),
            "sensorLevel": level,
            "emotion": "angry",
        }))
        .into_response(),
    }
}

async fn spawn_mock_gateway() -> String {
    let app = Router::new().route("/transform", post(transform));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn successful_remote_transform() {
    let client = GatewayClient::new(spawn_mock_gateway().await);

    let result = client
        .transform(TransformRequest::new("I'm going home", SensorLevel::Raw))
        .await
        .unwrap();

    assert_eq!(result.transformed_text, "Screw you guys, I'm going home");
    assert_eq!(result.original_text, "I'm going home");
    assert_eq!(result.sensor_level, SensorLevel::Raw);
    assert_eq!(result.emotion, Some(Emotion::Angry));
}

async fn failure(client: &GatewayClient, text: &str) -> TransformError {
    client
        .transform(TransformRequest::new(text, SensorLevel::Medium))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn status_codes_map_to_transform_errors() {
    let client = GatewayClient::new(spawn_mock_gateway().await);

    assert!(matches!(
        failure(&client, "").await,
        TransformError::Validation(ValidationError::EmptyText)
    ));
    assert!(matches!(failure(&client, "bad-key").await, TransformError::UpstreamAuth));
    assert!(matches!(failure(&client, "limited").await, TransformError::UpstreamRateLimited));
    assert!(matches!(failure(&client, "boom").await, TransformError::Upstream { .. }));
    assert!(matches!(failure(&client, "garbage").await, TransformError::Upstream { .. }));
}

#[tokio::test]
async fn invalid_level_is_reported_as_validation() {
    let client = GatewayClient::new(spawn_mock_gateway().await);
    let request = TransformRequest {
        text: "hi".into(),
        sensor_level: "loud".into(),
        character: None,
    };

    let err = client.transform(request).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "Invalid sensor level. Must be: mild, medium, or raw");
}

#[tokio::test]
async fn unreachable_gateway_is_upstream_error() {
    let client = GatewayClient::new("http://127.0.0.1:9");
    let err = client
        .transform(TransformRequest::new("hello", SensorLevel::Mild))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 500);
}
