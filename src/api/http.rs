//! axum front end over a shared [`Predictor`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

use crate::common::config::AppCfg;
use crate::common::error::StormResult;
use crate::inference::{HealthReport, PredictResponse, Predictor};

pub type SharedPredictor = Arc<Predictor>;

/// Largest `/predict` body buffered; bigger bodies get the failure envelope.
pub const MAX_PREDICT_BODY: usize = 1 << 20;

/// Routes: `GET /health`, `GET /model/info`, `POST /predict`; CORS wide open.
pub fn router(predictor: SharedPredictor) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/model/info", get(model_info))
        .route(
            "/predict",
            post(predict).layer(DefaultBodyLimit::max(MAX_PREDICT_BODY)),
        )
        .layer(cors)
        .with_state(predictor)
}

async fn health(State(predictor): State<SharedPredictor>) -> Json<HealthReport> {
    Json(predictor.health_check())
}

async fn model_info(State(predictor): State<SharedPredictor>) -> Response {
    Json(predictor.model_info()).into_response()
}

/// The body is buffered and parsed by hand so oversized or malformed bodies
/// still get the failure envelope.
///
/// TODO: run learned-mode scoring under `spawn_blocking`; the forward pass
/// holds a runtime worker for the whole request.
async fn predict(
    State(predictor): State<SharedPredictor>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected unreadable predict body");
            return failure(format!("unreadable request body: {rejection}"));
        }
    };

    let response = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(record)) => predictor.predict_response(&record),
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "rejected non-object predict body");
            PredictResponse::Failure {
                error: format!("request body must be a JSON object, got {}", json_kind(&other)),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "rejected malformed predict body");
            PredictResponse::Failure {
                error: format!("invalid JSON body: {err}"),
            }
        }
    };

    let status = if response.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response)).into_response()
}

fn failure(error: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(PredictResponse::Failure { error }),
    )
        .into_response()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Bind `cfg.bind_addr()` and serve until ctrl-c.
pub async fn serve(cfg: &AppCfg, predictor: SharedPredictor) -> StormResult<()> {
    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("prediction API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(predictor))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub(crate) async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(Predictor::from_config(&AppCfg::default())))
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = app()
            .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn json_kind_names_every_variant() {
        assert_eq!(json_kind(&serde_json::json!([1])), "an array");
        assert_eq!(json_kind(&serde_json::json!("x")), "a string");
        assert_eq!(json_kind(&Value::Null), "null");
    }
}
