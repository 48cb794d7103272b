//! Domain types for scoring: features, confidences and the strategy seam.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::common::error::{ScoringError, StormError};

/// Number of features fed into every model.
pub const FEATURE_COUNT: usize = 8;

/// Feature names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "temperature",
    "humidity",
    "pressure",
    "wind_speed",
    "visibility",
    "cloud_cover",
    "uv_index",
    "precipitation",
];

/// Values used for features missing from a weather record.
pub const FEATURE_DEFAULTS: [f64; FEATURE_COUNT] = [20.0, 50.0, 1013.0, 10.0, 10.0, 0.0, 5.0, 0.0];

/// Ordered weather features.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self(FEATURE_DEFAULTS)
    }
}

/// Model confidence. Only constructed through a clamp.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Clamp `value` into `[lo, hi]`. Non-finite values are rejected.
    pub fn clamped(value: f64, lo: f64, hi: f64) -> Option<Self> {
        value.is_finite().then(|| Self(value.clamp(lo, hi)))
    }

    /// Constant used when the fallback model itself fails.
    pub const fn default_value() -> Self {
        Self(0.5)
    }

    /// The clamped score.
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Which strategy is scoring requests.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    Fallback,
    Learned,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Fallback => "fallback",
            ScoringMode::Learned => "learned",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringMode {
    type Err = StormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Ok(ScoringMode::Fallback),
            "learned" => Ok(ScoringMode::Learned),
            other => Err(StormError::config(format!(
                "unknown scoring mode '{other}' (expected 'fallback' or 'learned')"
            ))),
        }
    }
}

/// A way of turning features into a confidence for one algorithm.
pub trait ScoringStrategy: Send + Sync {
    fn mode(&self) -> ScoringMode;
    fn score(&self, algorithm: &str, features: &FeatureVector) -> Result<Confidence, ScoringError>;
}

/// Logistic activation.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
