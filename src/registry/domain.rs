//! Algorithm profiles and the fixed registry they live in.
//!
//! Accuracy figures are declared metadata; nothing at runtime reads them.

use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Label used when an algorithm declares no event labels.
pub const DEFAULT_EVENT_LABEL: &str = "weather_event";

/// Identifier for a registered algorithm, e.g. `StormChaser-v4`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct AlgorithmId(String);

impl AlgorithmId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// The wire name, e.g. `StormChaser-v4`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Architecture family an algorithm claims to use.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ModelKind {
    #[serde(rename = "LSTM")]
    Lstm,
    #[serde(rename = "CNN-LSTM")]
    CnnLstm,
    #[serde(rename = "Transformer")]
    Transformer,
    #[serde(rename = "RNN")]
    Rnn,
    #[serde(rename = "GRU")]
    Gru,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Lstm => "LSTM",
            ModelKind::CnnLstm => "CNN-LSTM",
            ModelKind::Transformer => "Transformer",
            ModelKind::Rnn => "RNN",
            ModelKind::Gru => "GRU",
        }
    }
}

/// Ordered event labels, most severe first.
#[derive(Clone, Debug, PartialEq)]
pub struct EventLabels(Vec<&'static str>);

impl EventLabels {
    pub fn new(labels: &[&'static str]) -> Self {
        Self(labels.to_vec())
    }

    /// Pick the label for a confidence: index 0 above 0.8, index 1 above 0.6,
    /// index 2 otherwise. Missing slots collapse to index 0.
    pub fn select(&self, confidence: f64) -> &'static str {
        let labels = &self.0;
        let first = labels.first().copied().unwrap_or(DEFAULT_EVENT_LABEL);
        if confidence > 0.8 {
            first
        } else if confidence > 0.6 {
            labels.get(1).copied().unwrap_or(first)
        } else {
            labels.get(2).copied().unwrap_or(first)
        }
    }
}

/// Static description of one scoring algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct AlgorithmProfile {
    pub id: AlgorithmId,
    pub specialization: &'static str,
    pub accuracy: f64,
    pub kind: ModelKind,
    pub events: EventLabels,
}

impl AlgorithmProfile {
    pub fn new(
        id: &str,
        specialization: &'static str,
        accuracy: f64,
        kind: ModelKind,
        events: &[&'static str],
    ) -> Self {
        Self {
            id: AlgorithmId::new(id),
            specialization,
            accuracy,
            kind,
            events: EventLabels::new(events),
        }
    }
}

impl Serialize for AlgorithmProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("AlgorithmProfile", 4)?;
        s.serialize_field("specialization", self.specialization)?;
        s.serialize_field("accuracy", &self.accuracy)?;
        s.serialize_field("model_type", &self.kind)?;
        s.serialize_field("status", "ready")?;
        s.end()
    }
}

/// Immutable, ordered collection of algorithm profiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Registry {
    profiles: Vec<AlgorithmProfile>,
}

impl Registry {
    pub fn new(profiles: Vec<AlgorithmProfile>) -> Self {
        Self { profiles }
    }

    /// The five weather algorithms in registration order.
    pub fn standard() -> Self {
        Self::new(vec![
            AlgorithmProfile::new(
                "ThermalDrift-v2",
                "Temperature anomalies and thermal flows",
                94.2,
                ModelKind::Lstm,
                &["heat_wave", "cold_snap", "thermal_anomaly"],
            ),
            AlgorithmProfile::new(
                "StormChaser-v4",
                "Storm prediction and extreme weather",
                97.8,
                ModelKind::CnnLstm,
                &["thunderstorm", "tornado", "hurricane"],
            ),
            AlgorithmProfile::new(
                "EcoBalance-v1",
                "Climate change monitoring",
                91.5,
                ModelKind::Transformer,
                &["climate_shift", "seasonal_anomaly", "eco_change"],
            ),
            AlgorithmProfile::new(
                "AuroraPredictor-v3",
                "Aurora and magnetic storms",
                89.3,
                ModelKind::Rnn,
                &["aurora_borealis", "solar_storm", "magnetic_anomaly"],
            ),
            AlgorithmProfile::new(
                "AquaDetect-v2",
                "Water cycles and precipitation",
                96.1,
                ModelKind::Gru,
                &["heavy_rain", "flood", "drought"],
            ),
        ])
    }

    /// Profiles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AlgorithmProfile> {
        self.profiles.iter()
    }

    /// Look up a profile by its exact id.
    pub fn get(&self, id: &str) -> Option<&AlgorithmProfile> {
        self.profiles.iter().find(|p| p.id.as_str() == id)
    }

    /// Number of registered algorithms.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Serialises as `{id: profile}` in registration order.
impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.profiles.len()))?;
        for profile in &self.profiles {
            map.serialize_entry(profile.id.as_str(), profile)?;
        }
        map.end()
    }
}
