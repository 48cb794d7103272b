//! Placeholder recurrent-plus-attention scorer.
//!
//! Every algorithm gets an untrained network: stacked LSTM, multi-head
//! self-attention over the LSTM outputs, dropout, a linear head and a sigmoid.
//! Weights are drawn once from a seeded RNG, so outputs are deterministic for a
//! given seed but carry no predictive meaning. Nothing here is ever trained.
//!
//! TODO: Load trained weights from disk instead of seeding them, once a
//! training pipeline produces artefacts.

use std::collections::HashMap;

use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::error::ScoringError;
use crate::common::ids;
use crate::registry::Registry;

use super::domain::{
    sigmoid, Confidence, FeatureVector, ScoringMode, ScoringStrategy, FEATURE_COUNT,
};

/// Shape of every placeholder network.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Architecture {
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub num_heads: usize,
    /// Recorded for completeness; inference never applies dropout.
    pub dropout: f64,
}

impl Default for Architecture {
    fn default() -> Self {
        Self {
            input_size: FEATURE_COUNT,
            hidden_size: 128,
            num_layers: 2,
            num_heads: 8,
            dropout: 0.2,
        }
    }
}

impl Architecture {
    fn validate(&self) -> Result<(), ScoringError> {
        if self.input_size != FEATURE_COUNT {
            return Err(ScoringError::Placeholder(format!(
                "input_size must be {FEATURE_COUNT}, got {}",
                self.input_size
            )));
        }
        if self.hidden_size == 0 || self.num_layers == 0 || self.num_heads == 0 {
            return Err(ScoringError::Placeholder(
                "hidden_size, num_layers and num_heads must be non-zero".to_string(),
            ));
        }
        if self.hidden_size % self.num_heads != 0 {
            return Err(ScoringError::Placeholder(format!(
                "hidden_size {} is not divisible by {} heads",
                self.hidden_size, self.num_heads
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ScoringError::Placeholder(format!(
                "dropout {} outside [0, 1)",
                self.dropout
            )));
        }
        Ok(())
    }
}

fn uniform_matrix(rng: &mut StdRng, rows: usize, cols: usize, bound: f64) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-bound..bound))
}

fn uniform_vector(rng: &mut StdRng, len: usize, bound: f64) -> Array1<f64> {
    Array1::from_shape_fn(len, |_| rng.gen_range(-bound..bound))
}

/// Gate order along the first axis: input, forget, cell, output.
struct LstmLayer {
    hidden: usize,
    w_ih: Array2<f64>,
    w_hh: Array2<f64>,
    b_ih: Array1<f64>,
    b_hh: Array1<f64>,
}

impl LstmLayer {
    fn new(rng: &mut StdRng, input: usize, hidden: usize) -> Self {
        let bound = 1.0 / (hidden as f64).sqrt();
        Self {
            hidden,
            w_ih: uniform_matrix(rng, 4 * hidden, input, bound),
            w_hh: uniform_matrix(rng, 4 * hidden, hidden, bound),
            b_ih: uniform_vector(rng, 4 * hidden, bound),
            b_hh: uniform_vector(rng, 4 * hidden, bound),
        }
    }

    /// `seq` is `(steps, input)`; returns `(steps, hidden)`.
    fn forward(&self, seq: &Array2<f64>) -> Array2<f64> {
        let n = self.hidden;
        let mut h = Array1::<f64>::zeros(n);
        let mut c = Array1::<f64>::zeros(n);
        let mut out = Array2::<f64>::zeros((seq.nrows(), n));

        for (t, x) in seq.rows().into_iter().enumerate() {
            let gates = self.w_ih.dot(&x) + &self.b_ih + self.w_hh.dot(&h) + &self.b_hh;
            let i = gates.slice(s![0..n]).mapv(sigmoid);
            let f = gates.slice(s![n..2 * n]).mapv(sigmoid);
            let g = gates.slice(s![2 * n..3 * n]).mapv(f64::tanh);
            let o = gates.slice(s![3 * n..4 * n]).mapv(sigmoid);

            c = &f * &c + &i * &g;
            h = &o * &c.mapv(f64::tanh);
            out.row_mut(t).assign(&h);
        }
        out
    }
}

struct SelfAttention {
    heads: usize,
    in_proj: Array2<f64>,
    in_bias: Array1<f64>,
    out_proj: Array2<f64>,
    out_bias: Array1<f64>,
}

impl SelfAttention {
    fn new(rng: &mut StdRng, embed: usize, heads: usize) -> Self {
        let xavier = (6.0 / (embed + 3 * embed) as f64).sqrt();
        let out_bound = 1.0 / (embed as f64).sqrt();
        Self {
            heads,
            in_proj: uniform_matrix(rng, 3 * embed, embed, xavier),
            in_bias: Array1::zeros(3 * embed),
            out_proj: uniform_matrix(rng, embed, embed, out_bound),
            out_bias: Array1::zeros(embed),
        }
    }

    /// Scaled dot-product attention with `q = k = v = seq`.
    fn forward(&self, seq: &Array2<f64>) -> Array2<f64> {
        let embed = seq.ncols();
        let head_dim = embed / self.heads;
        let scale = 1.0 / (head_dim as f64).sqrt();

        let qkv = seq.dot(&self.in_proj.t()) + &self.in_bias;
        let q = qkv.slice(s![.., 0..embed]);
        let k = qkv.slice(s![.., embed..2 * embed]);
        let v = qkv.slice(s![.., 2 * embed..3 * embed]);

        let mut merged = Array2::<f64>::zeros((seq.nrows(), embed));
        for head in 0..self.heads {
            let (lo, hi) = (head * head_dim, (head + 1) * head_dim);
            let mut weights = q.slice(s![.., lo..hi]).dot(&k.slice(s![.., lo..hi]).t()) * scale;
            for mut row in weights.rows_mut() {
                let max = row.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
                row.mapv_inplace(|x| (x - max).exp());
                let total = row.sum();
                row.mapv_inplace(|x| x / total);
            }
            merged
                .slice_mut(s![.., lo..hi])
                .assign(&weights.dot(&v.slice(s![.., lo..hi])));
        }

        merged.dot(&self.out_proj.t()) + &self.out_bias
    }
}

/// One untrained network.
struct WeatherNet {
    lstm: Vec<LstmLayer>,
    attention: SelfAttention,
    head_w: Array1<f64>,
    head_b: f64,
}

impl WeatherNet {
    fn new(arch: &Architecture, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let lstm = (0..arch.num_layers)
            .map(|layer| {
                let input = if layer == 0 {
                    arch.input_size
                } else {
                    arch.hidden_size
                };
                LstmLayer::new(&mut rng, input, arch.hidden_size)
            })
            .collect();
        let attention = SelfAttention::new(&mut rng, arch.hidden_size, arch.num_heads);
        let bound = 1.0 / (arch.hidden_size as f64).sqrt();
        let head_w = uniform_vector(&mut rng, arch.hidden_size, bound);
        let head_b = rng.gen_range(-bound..bound);

        Self {
            lstm,
            attention,
            head_w,
            head_b,
        }
    }

    /// The feature vector is a sequence of length one.
    fn forward(&self, features: &FeatureVector) -> f64 {
        let mut seq = Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| features.as_slice()[j]);
        for layer in &self.lstm {
            seq = layer.forward(&seq);
        }
        let attended = self.attention.forward(&seq);
        let last = attended.row(attended.nrows() - 1);
        sigmoid(last.dot(&self.head_w) + self.head_b)
    }
}

/// Untrained per-algorithm networks. Scores are stable for a seed and
/// otherwise meaningless.
pub struct LearnedStrategy {
    networks: HashMap<String, WeatherNet>,
}

impl LearnedStrategy {
    /// One network per registered algorithm, each seeded from `seed` and its id.
    pub fn new(registry: &Registry, seed: u64) -> Result<Self, ScoringError> {
        Self::with_architecture(registry, seed, Architecture::default())
    }

    /// Fails when `arch` cannot be built, e.g. heads not dividing the hidden size.
    pub fn with_architecture(
        registry: &Registry,
        seed: u64,
        arch: Architecture,
    ) -> Result<Self, ScoringError> {
        arch.validate()?;
        let networks = registry
            .iter()
            .map(|profile| {
                let net = WeatherNet::new(&arch, ids::algorithm_seed(seed, profile.id.as_str()));
                tracing::info!(
                    algorithm = %profile.id,
                    declared_kind = profile.kind.as_str(),
                    "placeholder network initialised (untrained)"
                );
                (profile.id.as_str().to_string(), net)
            })
            .collect();
        Ok(Self { networks })
    }
}

impl ScoringStrategy for LearnedStrategy {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Learned
    }

    fn score(&self, algorithm: &str, features: &FeatureVector) -> Result<Confidence, ScoringError> {
        let net = self
            .networks
            .get(algorithm)
            .ok_or_else(|| ScoringError::UnknownAlgorithm(algorithm.to_string()))?;
        let raw = net.forward(features);
        Confidence::clamped(raw, 0.0, 1.0).ok_or_else(|| ScoringError::NonFinite {
            algorithm: algorithm.to_string(),
            value: raw,
        })
    }
}
