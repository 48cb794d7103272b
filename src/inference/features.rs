//! Feature extraction from loosely typed weather records.

use serde_json::{Map, Value};

use crate::common::error::FeatureExtractionError;
use crate::scoring::domain::{FeatureVector, FEATURE_COUNT, FEATURE_DEFAULTS, FEATURE_NAMES};

/// A weather record as received on the wire.
pub type WeatherRecord = Map<String, Value>;

/// Build the feature vector, substituting defaults for missing keys.
pub fn extract(record: &WeatherRecord) -> Result<FeatureVector, FeatureExtractionError> {
    let mut values = [0.0; FEATURE_COUNT];
    for (slot, (&field, &default)) in values
        .iter_mut()
        .zip(FEATURE_NAMES.iter().zip(FEATURE_DEFAULTS.iter()))
    {
        *slot = match record.get(field) {
            None => default,
            Some(value) => coerce(field, value)?,
        };
    }
    Ok(FeatureVector::new(values))
}

/// Numbers pass through, numeric strings are parsed, booleans become 1/0.
fn coerce(field: &'static str, value: &Value) -> Result<f64, FeatureExtractionError> {
    let fail = |reason: String| FeatureExtractionError { field, reason };
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| fail(format!("{n} is not representable as f64"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| fail(format!("'{s}' is not a number"))),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Err(fail("null is not a number".to_string())),
        Value::Array(_) => Err(fail("arrays are not numbers".to_string())),
        Value::Object(_) => Err(fail("objects are not numbers".to_string())),
    }
}
