//! Scoring strategies and the engine that dispatches between them.

pub mod domain;
pub mod engine;
pub mod fallback;
pub mod learned;

pub use domain::{Confidence, FeatureVector, ScoringMode, ScoringStrategy};
pub use engine::{ModelStatus, ScoringEngine};
pub use fallback::FallbackStrategy;
pub use learned::{Architecture, LearnedStrategy};
