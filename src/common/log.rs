//! Tracing setup and the per-request outcome event.

use tracing_subscriber::EnvFilter;

use crate::common::config::AppCfg;
use crate::common::error::StormCode;

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(cfg: &AppCfg) {
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = if cfg.log_json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };
}

/// Emit the outcome of one operation with the `mod`/`ev`/`code`/`dur_ms` schema.
pub fn outcome(module: &str, event: &str, code: StormCode, dur_ms: u128) {
    if code == StormCode::Ok {
        tracing::info!(
            "mod" = module,
            ev = event,
            code = code as u32,
            dur_ms = dur_ms as u64,
            "operation finished"
        );
    } else {
        tracing::warn!(
            "mod" = module,
            ev = event,
            code = code as u32,
            dur_ms = dur_ms as u64,
            "operation failed"
        );
    }
}
