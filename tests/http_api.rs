//! HTTP contract of the axum front end.
//!
//! Tests:
//! 1. /health and /model/info payload shapes
//! 2. POST /predict success envelope
//! 3. Failure envelopes for bad fields, malformed JSON, non-object and
//!    oversized bodies
//! 4. Wildcard CORS on responses and preflight
//! 5. Degraded model status when the learned networks cannot be built

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use stormcast::api::http::MAX_PREDICT_BODY;
use stormcast::api::router;
use stormcast::registry::Registry;
use stormcast::scoring::{Architecture, ModelStatus, ScoringEngine, ScoringMode};
use stormcast::{AppCfg, Predictor};
use tower::ServiceExt;

fn app() -> Router {
    router(Arc::new(Predictor::from_config(&AppCfg::default())))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_predict(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_payload_shape() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_status"], "ready");
    assert_eq!(json["sd_environment"], false);
    assert_eq!(json["pytorch_available"], false);
    assert_eq!(json["algorithms_count"], 5);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn model_info_lists_algorithms() {
    let response = app()
        .oneshot(Request::builder().uri("/model/info").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let algorithms = json["algorithms"].as_object().unwrap();
    assert_eq!(algorithms.len(), 5);
    assert_eq!(algorithms["StormChaser-v4"]["accuracy"], 97.8);
    assert_eq!(algorithms["StormChaser-v4"]["status"], "ready");
    assert_eq!(json["scoring_mode"], "fallback");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn predict_storm_record() {
    let body = r#"{"temperature":35,"humidity":85,"pressure":995,"wind_speed":45,
                   "visibility":2,"cloud_cover":90,"uv_index":1,"precipitation":15}"#;
    let response = app().oneshot(post_predict(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["confidence"], 0.95);
    assert_eq!(json["rarity"], "legendary");
    assert_eq!(json["all_predictions"].as_object().unwrap().len(), 5);
}

#[tokio::test]
async fn predict_bad_field_is_500_envelope() {
    let response = app()
        .oneshot(post_predict(r#"{"temperature":"abc"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["model_type"], "error");
    assert!(json["error"].as_str().unwrap().contains("temperature"));
}

#[tokio::test]
async fn predict_malformed_json_is_500_envelope() {
    let response = app().oneshot(post_predict("{oops")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().starts_with("invalid JSON body"));
}

#[tokio::test]
async fn predict_array_body_is_rejected() {
    let response = app().oneshot(post_predict("[1,2,3]")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("an array"));
}

#[tokio::test]
async fn responses_carry_wildcard_cors() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn oversized_predict_body_is_500_envelope() {
    let body = format!(r#"{{"padding":"{}"}}"#, "x".repeat(MAX_PREDICT_BODY + 1));
    let response = app().oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["model_type"], "error");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("unreadable request body"));
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/predict")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn health_reports_degraded_when_networks_cannot_be_built() {
    let registry = Registry::standard();
    let arch = Architecture {
        hidden_size: 100,
        ..Architecture::default()
    };
    let engine = ScoringEngine::build_with_architecture(&registry, ScoringMode::Learned, 42, arch);
    assert_eq!(engine.status(), ModelStatus::Degraded);
    let app = router(Arc::new(Predictor::new(registry, engine, false)));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["model_status"], "degraded");
    assert_eq!(json["pytorch_available"], false);
}
