//! Domain definitions for predictions and the payloads built from them.

use std::path::PathBuf;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::registry::{AlgorithmId, Registry};
use crate::scoring::{Confidence, ModelStatus, ScoringMode};

/// Display tier derived from a confidence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Thresholds are inclusive, so a boundary value lands in the higher tier.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.95 {
            Rarity::Legendary
        } else if confidence >= 0.85 {
            Rarity::Epic
        } else if confidence >= 0.70 {
            Rarity::Rare
        } else if confidence >= 0.50 {
            Rarity::Uncommon
        } else {
            Rarity::Common
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

/// Outcome of one algorithm on one record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub algorithm: AlgorithmId,
    pub confidence: Confidence,
    pub event_type: &'static str,
    pub rarity: Rarity,
}

/// All per-algorithm predictions plus the selected best one.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionResult {
    /// Registration order.
    pub predictions: Vec<Prediction>,
    pub best: usize,
    pub mode: ScoringMode,
}

impl PredictionResult {
    /// The highest-confidence prediction, earliest on ties.
    pub fn best(&self) -> &Prediction {
        &self.predictions[self.best]
    }

    pub fn get(&self, algorithm: &str) -> Option<&Prediction> {
        self.predictions
            .iter()
            .find(|p| p.algorithm.as_str() == algorithm)
    }
}

/// `{id: prediction}` in registration order.
struct PredictionMap<'a>(&'a [Prediction]);

impl Serialize for PredictionMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for prediction in self.0 {
            map.serialize_entry(prediction.algorithm.as_str(), prediction)?;
        }
        map.end()
    }
}

/// Wire envelope for `/predict`.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictResponse {
    Success(PredictionResult),
    Failure { error: String },
}

impl PredictResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, PredictResponse::Success(_))
    }
}

impl Serialize for PredictResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PredictResponse::Success(result) => {
                let best = result.best();
                let mut map = serializer.serialize_map(Some(7))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("algorithm", &best.algorithm)?;
                map.serialize_entry("confidence", &best.confidence)?;
                map.serialize_entry("event_type", best.event_type)?;
                map.serialize_entry("rarity", &best.rarity)?;
                map.serialize_entry("all_predictions", &PredictionMap(&result.predictions))?;
                map.serialize_entry("model_type", &result.mode)?;
                map.end()
            }
            PredictResponse::Failure { error } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("model_type", "error")?;
                map.end()
            }
        }
    }
}

/// Payload for `/health`.
#[derive(Clone, Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub model_status: ModelStatus,
    pub sd_environment: bool,
    #[serde(rename = "pytorch_available")]
    pub learned_available: bool,
    pub algorithms_count: usize,
    pub timestamp: String,
}

/// Payload for `/model/info`.
#[derive(Clone, Debug, Serialize)]
pub struct ModelInfo<'a> {
    pub status: ModelStatus,
    pub sd_environment: bool,
    #[serde(rename = "pytorch_available")]
    pub learned_available: bool,
    pub scoring_mode: ScoringMode,
    pub placeholder: bool,
    pub algorithms: &'a Registry,
    pub algorithms_count: usize,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
    pub timestamp: String,
}
