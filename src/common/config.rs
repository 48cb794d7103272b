//! Runtime configuration loaded from the process environment.
//!
//! The binary layers its command line flags over this snapshot; library users
//! build an [`AppCfg`] by hand or call [`AppCfg::load`].

use std::env;

use crate::common::error::{StormError, StormResult};
use crate::scoring::ScoringMode;

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug, PartialEq)]
pub struct AppCfg {
    pub host: String,
    pub port: u16,
    pub scoring: ScoringMode,
    /// Base seed for the placeholder learned networks.
    pub seed: u64,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
    pub log_json: bool,
    pub sd_environment: bool,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            scoring: ScoringMode::Fallback,
            seed: 42,
            log_filter: "stormcast=info".to_string(),
            log_json: false,
            sd_environment: false,
        }
    }
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> StormResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> StormResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = match lookup("STORMCAST_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| StormError::config(format!("STORMCAST_PORT='{raw}' is not a port")))?,
            None => defaults.port,
        };

        let scoring = match lookup("STORMCAST_SCORING") {
            Some(raw) => raw.parse::<ScoringMode>()?,
            None => defaults.scoring,
        };

        let seed = match lookup("STORMCAST_SEED") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| StormError::config(format!("STORMCAST_SEED='{raw}' is not a u64")))?,
            None => defaults.seed,
        };

        let log_json = matches!(
            env_or("STORMCAST_LOG_JSON", "false").trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );

        Ok(Self {
            host: env_or("STORMCAST_HOST", &defaults.host),
            port,
            scoring,
            seed,
            log_filter: env_or("STORMCAST_LOG", &defaults.log_filter),
            log_json,
            sd_environment: detect_sd_environment(lookup("CONDA_DEFAULT_ENV").as_deref()),
        })
    }

    /// `host:port` for the listeners.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A conda environment named like `sd-*` or `stable-diffusion` counts as active.
pub fn detect_sd_environment(conda_env: Option<&str>) -> bool {
    conda_env
        .map(|name| {
            let name = name.to_ascii_lowercase();
            name.contains("sd") || name.contains("stable")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = AppCfg::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, AppCfg::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn environment_overrides_are_applied() {
        let cfg = AppCfg::from_lookup(lookup_from(&[
            ("STORMCAST_PORT", "9100"),
            ("STORMCAST_SCORING", "learned"),
            ("STORMCAST_SEED", "7"),
            ("STORMCAST_LOG_JSON", "TRUE"),
            ("CONDA_DEFAULT_ENV", "Stable-Diffusion"),
        ]))
        .unwrap();

        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.scoring, ScoringMode::Learned);
        assert_eq!(cfg.seed, 7);
        assert!(cfg.log_json);
        assert!(cfg.sd_environment);
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let err = AppCfg::from_lookup(lookup_from(&[("STORMCAST_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, StormError::Config(_)));
    }

    #[test]
    fn sd_detection_matches_conda_names() {
        assert!(detect_sd_environment(Some("sd-webui")));
        assert!(!detect_sd_environment(Some("base")));
        assert!(!detect_sd_environment(None));
    }
}
