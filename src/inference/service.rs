//! Prediction orchestration: features in, per-algorithm predictions out.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::common::config::AppCfg;
use crate::common::error::{StormCode, StormError, StormResult};
use crate::common::{log, time};
use crate::registry::Registry;
use crate::scoring::{ScoringEngine, ScoringMode};

use super::domain::{
    HealthReport, ModelInfo, PredictResponse, Prediction, PredictionResult, Rarity,
};
use super::features::{self, WeatherRecord};

/// Immutable orchestrator shared by every transport.
pub struct Predictor {
    registry: Registry,
    engine: ScoringEngine,
    sd_environment: bool,
}

impl Predictor {
    /// Assemble a predictor from parts; tests use this to inject strategies.
    pub fn new(registry: Registry, engine: ScoringEngine, sd_environment: bool) -> Self {
        Self {
            registry,
            engine,
            sd_environment,
        }
    }

    /// Standard registry plus an engine built for `cfg.scoring`.
    pub fn from_config(cfg: &AppCfg) -> Self {
        let registry = Registry::standard();
        let engine = ScoringEngine::build(&registry, cfg.scoring, cfg.seed);
        tracing::info!(
            algorithms = registry.len(),
            mode = %engine.mode(),
            sd_environment = cfg.sd_environment,
            "predictor ready"
        );
        Self::new(registry, engine, cfg.sd_environment)
    }

    /// The fixed algorithm table this predictor scores against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mode tag reported as `model_type` on successful predictions.
    pub fn mode(&self) -> ScoringMode {
        self.engine.mode()
    }

    /// Score every registered algorithm and pick the most confident one.
    pub fn predict(&self, record: &WeatherRecord) -> StormResult<PredictionResult> {
        let features = features::extract(record)?;

        let predictions: Vec<Prediction> = self
            .registry
            .iter()
            .map(|profile| {
                let confidence = self.engine.score(profile.id.as_str(), &features);
                Prediction {
                    algorithm: profile.id.clone(),
                    confidence,
                    event_type: profile.events.select(confidence.value()),
                    rarity: Rarity::from_confidence(confidence.value()),
                }
            })
            .collect();

        let best = select_best(&predictions)
            .ok_or_else(|| StormError::orchestration("no algorithms registered"))?;

        Ok(PredictionResult {
            predictions,
            best,
            mode: self.engine.mode(),
        })
    }

    /// [`predict`](Self::predict) with every failure, panics included, folded
    /// into a `{success: false}` response.
    pub fn predict_response(&self, record: &WeatherRecord) -> PredictResponse {
        let start = time::now_ms();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.predict(record)))
            .unwrap_or_else(|payload| {
                Err(StormError::orchestration(panic_message(payload.as_ref())))
            });
        let dur_ms = time::now_ms().saturating_sub(start);

        match outcome {
            Ok(result) => {
                let best = result.best();
                tracing::debug!(
                    algorithm = %best.algorithm,
                    confidence = best.confidence.value(),
                    rarity = best.rarity.as_str(),
                    "prediction selected"
                );
                log::outcome("inference", "predict", StormCode::Ok, dur_ms);
                PredictResponse::Success(result)
            }
            Err(err) => {
                tracing::error!(error = %err, "prediction error");
                log::outcome("inference", "predict", err.code(), dur_ms);
                PredictResponse::Failure {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Liveness payload for `GET /health`.
    pub fn health_check(&self) -> HealthReport {
        HealthReport {
            status: "healthy",
            model_status: self.engine.status(),
            sd_environment: self.sd_environment,
            learned_available: self.engine.mode() == ScoringMode::Learned,
            algorithms_count: self.registry.len(),
            timestamp: time::now_iso(),
        }
    }

    /// Registry and runtime description for `GET /model/info`.
    pub fn model_info(&self) -> ModelInfo<'_> {
        let mode = self.engine.mode();
        ModelInfo {
            status: self.engine.status(),
            sd_environment: self.sd_environment,
            learned_available: mode == ScoringMode::Learned,
            scoring_mode: mode,
            placeholder: mode == ScoringMode::Learned,
            algorithms: &self.registry,
            algorithms_count: self.registry.len(),
            version: env!("CARGO_PKG_VERSION"),
            working_directory: std::env::current_dir().ok(),
            timestamp: time::now_iso(),
        }
    }
}

/// Index of the highest confidence; the earliest entry wins ties.
pub fn select_best(predictions: &[Prediction]) -> Option<usize> {
    predictions
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, p)| {
            let c = p.confidence.value();
            match best {
                Some((_, top)) if c <= top => best,
                _ => Some((idx, c)),
            }
        })
        .map(|(idx, _)| idx)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected failure in prediction pipeline".to_string())
}
