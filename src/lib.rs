// lib.rs - weather prediction core and its HTTP front ends
pub mod api;
pub mod common;
pub mod inference;
pub mod registry;
pub mod scoring;

pub use common::{AppCfg, StormCode, StormError, StormResult};
pub use inference::{PredictResponse, Predictor, WeatherRecord};
