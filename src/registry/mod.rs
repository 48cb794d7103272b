//! Fixed registry of weather algorithms.

pub mod domain;

pub use domain::{AlgorithmId, AlgorithmProfile, EventLabels, ModelKind, Registry};
