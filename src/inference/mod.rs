//! Inference domain: feature extraction, per-algorithm predictions and the
//! payloads served over HTTP.

pub mod domain;
pub mod features;
pub mod service;

pub use domain::{HealthReport, ModelInfo, PredictResponse, Prediction, PredictionResult, Rarity};
pub use features::WeatherRecord;
pub use service::Predictor;
