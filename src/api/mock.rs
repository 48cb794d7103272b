//! Raw-socket mock of the prediction API for front-end testing.
//!
//! Speaks just enough HTTP/1.1 to answer one request per connection. Payloads
//! are hardcoded: `/predict` returns the same StormChaser result whatever the
//! body says, as long as the body is valid JSON.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::common::config::AppCfg;
use crate::common::error::StormResult;
use crate::common::time;

/// Upper bound on accepted request bodies.
const MAX_BODY: usize = 1 << 20;

/// A response before it is written to the socket.
#[derive(Clone, Debug, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Option<Value>,
}

impl MockResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type", "application/json"),
                ("Access-Control-Allow-Origin", "*"),
            ],
            body: Some(body),
        }
    }

    fn empty(status: u16, headers: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            status,
            headers,
            body: None,
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    /// Serialise status line, headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self
            .body
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        let mut out = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason());
        for (name, value) in &self.headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str(&format!("Content-Length: {}\r\nConnection: close\r\n\r\n", body.len()));
        out.push_str(&body);
        out.into_bytes()
    }
}

/// Route one request to its canned answer.
pub fn respond(method: &str, path: &str, body: &[u8]) -> MockResponse {
    match (method, path) {
        ("GET", "/health") => MockResponse::json(200, health_payload()),
        ("GET", "/model/info") => MockResponse::json(200, model_info_payload()),
        ("POST", "/predict") => match serde_json::from_slice::<Value>(body) {
            Ok(_) => MockResponse::json(200, prediction_payload()),
            Err(err) => MockResponse::json(
                500,
                json!({
                    "success": false,
                    "error": err.to_string(),
                    "model_type": "error",
                }),
            ),
        },
        ("OPTIONS", _) => MockResponse::empty(
            200,
            vec![
                ("Access-Control-Allow-Origin", "*"),
                ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
                ("Access-Control-Allow-Headers", "Content-Type"),
            ],
        ),
        _ => MockResponse::empty(404, Vec::new()),
    }
}

fn health_payload() -> Value {
    json!({
        "status": "healthy",
        "model_status": "ready",
        "sd_environment": false,
        "pytorch_available": false,
        "algorithms_count": 5,
        "timestamp": time::now_iso(),
    })
}

fn model_info_payload() -> Value {
    json!({
        "status": "ready",
        "sd_environment": false,
        "pytorch_available": false,
        "algorithms": {
            "ThermalDrift-v2": { "accuracy": 94.2, "model_type": "LSTM", "status": "ready" },
            "StormChaser-v4": { "accuracy": 97.8, "model_type": "CNN-LSTM", "status": "ready" },
            "EcoBalance-v1": { "accuracy": 91.5, "model_type": "Transformer", "status": "ready" },
            "AuroraPredictor-v3": { "accuracy": 89.3, "model_type": "RNN", "status": "ready" },
            "AquaDetect-v2": { "accuracy": 96.1, "model_type": "GRU", "status": "ready" },
        },
        "algorithms_count": 5,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": time::now_iso(),
    })
}

fn prediction_payload() -> Value {
    json!({
        "success": true,
        "algorithm": "StormChaser-v4",
        "confidence": 0.87,
        "event_type": "thunderstorm",
        "rarity": "rare",
        "all_predictions": {
            "ThermalDrift-v2": { "confidence": 0.72, "event_type": "heat_wave", "rarity": "rare" },
            "StormChaser-v4": { "confidence": 0.87, "event_type": "thunderstorm", "rarity": "rare" },
            "EcoBalance-v1": { "confidence": 0.65, "event_type": "climate_shift", "rarity": "uncommon" },
        },
        "model_type": "fallback",
    })
}

/// Read one request off the stream: `(method, path, body)`.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<(String, String, Vec<u8>)> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_ascii_uppercase();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length.min(MAX_BODY)];
    reader.read_exact(&mut body).await?;
    Ok((method, path, body))
}

async fn handle(mut stream: TcpStream) -> std::io::Result<()> {
    let (method, path, body) = read_request(&mut stream).await?;
    let response = respond(&method, &path, &body);
    tracing::info!(%method, %path, status = response.status, "mock request");
    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}

/// Accept connections forever, one task per connection.
pub async fn serve_listener(listener: TcpListener) -> StormResult<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(async move {
            if let Err(err) = handle(stream).await {
                tracing::warn!(%peer, error = %err, "mock connection failed");
            }
        });
    }
}

/// Bind `cfg.bind_addr()` and serve the mock until ctrl-c.
pub async fn serve(cfg: &AppCfg) -> StormResult<()> {
    let listener = TcpListener::bind(cfg.bind_addr()).await?;
    tracing::info!("mock API listening on http://{}", listener.local_addr()?);
    tokio::select! {
        result = serve_listener(listener) => result,
        _ = super::http::shutdown_signal() => Ok(()),
    }
}
