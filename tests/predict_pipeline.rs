//! End-to-end behaviour of the prediction pipeline.
//!
//! Covers defaults, the saturated storm record, tie-breaking, malformed input
//! and the learned placeholder's determinism.

use serde_json::{json, Value};
use stormcast::common::error::ScoringError;
use stormcast::inference::{PredictResponse, Rarity};
use stormcast::registry::Registry;
use stormcast::scoring::{
    Confidence, FeatureVector, ScoringEngine, ScoringMode, ScoringStrategy,
};
use stormcast::{AppCfg, Predictor, WeatherRecord};

fn record(value: Value) -> WeatherRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn fallback_predictor() -> Predictor {
    Predictor::from_config(&AppCfg::default())
}

fn storm_record() -> WeatherRecord {
    record(json!({
        "temperature": 35,
        "humidity": 85,
        "pressure": 995,
        "wind_speed": 45,
        "visibility": 2,
        "cloud_cover": 90,
        "uv_index": 1,
        "precipitation": 15
    }))
}

/// Returns the same confidence for every algorithm.
struct Flat(f64);

impl ScoringStrategy for Flat {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Learned
    }

    fn score(&self, _: &str, _: &FeatureVector) -> Result<Confidence, ScoringError> {
        Ok(Confidence::clamped(self.0, 0.0, 1.0).unwrap())
    }
}

#[test]
fn empty_record_covers_all_five_algorithms() {
    let result = fallback_predictor().predict(&WeatherRecord::new()).unwrap();
    assert_eq!(result.predictions.len(), 5);
    assert_eq!(result.mode, ScoringMode::Fallback);
    for prediction in &result.predictions {
        let c = prediction.confidence.value();
        assert!((0.1..=0.95).contains(&c), "{c} outside fallback range");
    }
}

#[test]
fn storm_record_is_legendary_with_first_label() {
    let result = fallback_predictor().predict(&storm_record()).unwrap();

    let best = result.best();
    assert_eq!(best.algorithm.as_str(), "ThermalDrift-v2");
    assert_eq!(best.confidence.value(), 0.95);
    assert_eq!(best.rarity, Rarity::Legendary);
    assert_eq!(best.event_type, "heat_wave");

    let storm = result.get("StormChaser-v4").unwrap();
    assert_eq!(storm.event_type, "thunderstorm");
    let aqua = result.get("AquaDetect-v2").unwrap();
    assert_eq!(aqua.event_type, "heavy_rain");
}

#[test]
fn storm_record_wire_shape() {
    let response = fallback_predictor().predict_response(&storm_record());
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["algorithm"], "ThermalDrift-v2");
    assert_eq!(value["confidence"], 0.95);
    assert_eq!(value["event_type"], "heat_wave");
    assert_eq!(value["rarity"], "legendary");
    assert_eq!(value["model_type"], "fallback");

    let all = value["all_predictions"].as_object().unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all["AuroraPredictor-v3"]["event_type"], "aurora_borealis");
    assert_eq!(all["AuroraPredictor-v3"]["algorithm"], "AuroraPredictor-v3");
}

#[test]
fn ties_go_to_earliest_registration() {
    let registry = Registry::standard();
    let engine = ScoringEngine::with_strategy(&registry, Box::new(Flat(0.7)));
    let predictor = Predictor::new(registry, engine, false);

    let result = predictor.predict(&WeatherRecord::new()).unwrap();
    assert_eq!(result.best().algorithm.as_str(), "ThermalDrift-v2");
    assert_eq!(result.best().rarity, Rarity::Rare);
    assert_eq!(result.best().event_type, "cold_snap");
}

#[test]
fn low_confidence_picks_third_label() {
    let registry = Registry::standard();
    let engine = ScoringEngine::with_strategy(&registry, Box::new(Flat(0.3)));
    let predictor = Predictor::new(registry, engine, false);

    let result = predictor.predict(&WeatherRecord::new()).unwrap();
    assert_eq!(result.get("AquaDetect-v2").unwrap().event_type, "drought");
    assert_eq!(result.get("AquaDetect-v2").unwrap().rarity, Rarity::Common);
}

#[test]
fn malformed_field_is_a_structured_failure() {
    let bad = record(json!({ "temperature": "abc" }));
    let response = fallback_predictor().predict_response(&bad);
    assert!(!response.is_success());

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["model_type"], "error");
    assert!(value["error"].as_str().unwrap().contains("temperature"));

    match response {
        PredictResponse::Failure { error } => assert!(error.contains("abc")),
        PredictResponse::Success(_) => unreachable!(),
    }
}

#[test]
fn learned_placeholder_is_deterministic_per_seed() {
    let cfg = AppCfg {
        scoring: ScoringMode::Learned,
        seed: 1234,
        ..AppCfg::default()
    };
    let a = Predictor::from_config(&cfg).predict(&storm_record()).unwrap();
    let b = Predictor::from_config(&cfg).predict(&storm_record()).unwrap();

    assert_eq!(a.mode, ScoringMode::Learned);
    assert_eq!(a, b);
    for prediction in &a.predictions {
        let c = prediction.confidence.value();
        assert!((0.0..=1.0).contains(&c));
    }
}

#[test]
fn model_info_describes_every_algorithm() {
    let predictor = fallback_predictor();
    let value = serde_json::to_value(predictor.model_info()).unwrap();

    assert_eq!(value["status"], "ready");
    assert_eq!(value["pytorch_available"], false);
    assert_eq!(value["algorithms_count"], 5);
    assert_eq!(value["algorithms"]["EcoBalance-v1"]["model_type"], "Transformer");
    assert_eq!(value["algorithms"]["AquaDetect-v2"]["accuracy"], 96.1);
}
