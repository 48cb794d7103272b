//! Error handling primitives shared across the core.
//!
//! Scoring errors never leave the engine; everything else surfaces as a
//! [`StormError`] and is turned into a `{success: false}` payload at the edge.

use thiserror::Error;

/// Stable error codes attached to structured log events.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StormCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Input failed validation or coercion.
    InvalidInput = 1,
    /// Requested model was not available for an algorithm.
    ModelMissing = 2,
    /// Configuration could not be loaded.
    Config = 3,
    /// Catch-all for bugs and unexpected failures.
    Internal = 4,
}

/// A weather field could not be coerced into a floating point feature.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("could not convert field '{field}' to float: {reason}")]
pub struct FeatureExtractionError {
    pub field: &'static str,
    pub reason: String,
}

/// Failure inside a scoring strategy. Always absorbed by the engine.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("no model registered for algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("model output for '{algorithm}' is not finite ({value})")]
    NonFinite { algorithm: String, value: f64 },

    #[error("placeholder network rejected its configuration: {0}")]
    Placeholder(String),
}

impl ScoringError {
    pub fn code(&self) -> StormCode {
        match self {
            ScoringError::UnknownAlgorithm(_) => StormCode::ModelMissing,
            ScoringError::NonFinite { .. } | ScoringError::Placeholder(_) => StormCode::Internal,
        }
    }
}

/// Canonical error type for the core.
#[derive(Debug, Error)]
pub enum StormError {
    #[error(transparent)]
    FeatureExtraction(#[from] FeatureExtractionError),

    #[error("prediction failed: {0}")]
    Orchestration(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type StormResult<T> = Result<T, StormError>;

impl StormError {
    /// Machine readable code for logs.
    pub fn code(&self) -> StormCode {
        match self {
            StormError::FeatureExtraction(_) => StormCode::InvalidInput,
            StormError::Orchestration(_) | StormError::Io(_) => StormCode::Internal,
            StormError::Config(_) => StormCode::Config,
        }
    }

    pub fn orchestration(msg: impl Into<String>) -> Self {
        Self::Orchestration(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
