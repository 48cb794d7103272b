//! Scoring engine: a primary strategy backed by the fixed-weight fallback.

use serde::Serialize;

use crate::registry::Registry;

use super::domain::{Confidence, FeatureVector, ScoringMode, ScoringStrategy};
use super::fallback::FallbackStrategy;
use super::learned::{Architecture, LearnedStrategy};

/// Health of the model layer as reported by `/health`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Ready,
    /// A learned strategy was requested but could not be built.
    Degraded,
}

pub struct ScoringEngine {
    primary: Option<Box<dyn ScoringStrategy>>,
    fallback: FallbackStrategy,
    status: ModelStatus,
}

impl ScoringEngine {
    /// Build the engine for the requested mode with the standard network shape.
    pub fn build(registry: &Registry, mode: ScoringMode, seed: u64) -> Self {
        Self::build_with_architecture(registry, mode, seed, Architecture::default())
    }

    /// Like [`ScoringEngine::build`] with an explicit network shape. A learned
    /// strategy that fails to construct leaves the engine on the fallback path
    /// with a degraded status.
    pub fn build_with_architecture(
        registry: &Registry,
        mode: ScoringMode,
        seed: u64,
        arch: Architecture,
    ) -> Self {
        let fallback = FallbackStrategy::new(registry);
        match mode {
            ScoringMode::Fallback => {
                tracing::info!("scoring with fixed-weight fallback models");
                Self {
                    primary: None,
                    fallback,
                    status: ModelStatus::Ready,
                }
            }
            ScoringMode::Learned => match LearnedStrategy::with_architecture(registry, seed, arch) {
                Ok(learned) => {
                    tracing::warn!(
                        seed,
                        "scoring with untrained placeholder networks; confidences are not predictive"
                    );
                    Self {
                        primary: Some(Box::new(learned)),
                        fallback,
                        status: ModelStatus::Ready,
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "learned strategy unavailable, using fallback");
                    Self {
                        primary: None,
                        fallback,
                        status: ModelStatus::Degraded,
                    }
                }
            },
        }
    }

    /// Inject an arbitrary primary strategy.
    pub fn with_strategy(registry: &Registry, strategy: Box<dyn ScoringStrategy>) -> Self {
        Self {
            primary: Some(strategy),
            fallback: FallbackStrategy::new(registry),
            status: ModelStatus::Ready,
        }
    }

    /// Mode of the strategy actually answering; `Fallback` when degraded.
    pub fn mode(&self) -> ScoringMode {
        self.primary
            .as_ref()
            .map(|s| s.mode())
            .unwrap_or(ScoringMode::Fallback)
    }

    pub fn status(&self) -> ModelStatus {
        self.status
    }

    /// Score one algorithm. Never fails: primary errors fall through to the
    /// fallback model, fallback errors to the constant default.
    pub fn score(&self, algorithm: &str, features: &FeatureVector) -> Confidence {
        if let Some(primary) = &self.primary {
            match primary.score(algorithm, features) {
                Ok(confidence) => return confidence,
                Err(err) => {
                    tracing::warn!(
                        algorithm,
                        code = err.code() as u32,
                        error = %err,
                        "primary scoring failed, using fallback model"
                    );
                }
            }
        }

        self.fallback
            .score(algorithm, features)
            .unwrap_or_else(|err| {
                tracing::warn!(
                    algorithm,
                    code = err.code() as u32,
                    error = %err,
                    "fallback scoring failed, using default confidence"
                );
                Confidence::default_value()
            })
    }
}
