//! Fixed-weight linear scorer used when no learned model is active.

use std::collections::HashMap;

use crate::common::error::ScoringError;
use crate::registry::Registry;

use super::domain::{sigmoid, Confidence, FeatureVector, ScoringMode, ScoringStrategy};

pub const FALLBACK_WEIGHTS: [f64; 4] = [0.1, 0.2, 0.3, 0.4];
pub const FALLBACK_BIAS: f64 = 0.5;
pub const FALLBACK_FLOOR: f64 = 0.1;
pub const FALLBACK_CEILING: f64 = 0.95;

/// `sigmoid(w · x[..n] + b)` over the first `n = weights.len()` features.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearModel {
    pub fn standard() -> Self {
        Self {
            weights: FALLBACK_WEIGHTS.to_vec(),
            bias: FALLBACK_BIAS,
        }
    }

    /// Weighted sum plus bias, before activation.
    pub fn logit(&self, features: &FeatureVector) -> f64 {
        features
            .as_slice()
            .iter()
            .zip(&self.weights)
            .map(|(f, w)| f * w)
            .sum::<f64>()
            + self.bias
    }
}

/// One [`LinearModel`] per registered algorithm.
#[derive(Clone, Debug)]
pub struct FallbackStrategy {
    models: HashMap<String, LinearModel>,
}

impl FallbackStrategy {
    pub fn new(registry: &Registry) -> Self {
        let models = registry
            .iter()
            .map(|profile| {
                tracing::debug!(algorithm = %profile.id, "fallback model ready");
                (profile.id.as_str().to_string(), LinearModel::standard())
            })
            .collect();
        Self { models }
    }
}

impl ScoringStrategy for FallbackStrategy {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Fallback
    }

    fn score(&self, algorithm: &str, features: &FeatureVector) -> Result<Confidence, ScoringError> {
        let model = self
            .models
            .get(algorithm)
            .ok_or_else(|| ScoringError::UnknownAlgorithm(algorithm.to_string()))?;

        let activated = sigmoid(model.logit(features));
        Confidence::clamped(activated, FALLBACK_FLOOR, FALLBACK_CEILING).ok_or_else(|| {
            ScoringError::NonFinite {
                algorithm: algorithm.to_string(),
                value: activated,
            }
        })
    }
}
