//! Simple time helpers used by multiple services.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Local;

/// Current timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Local wall-clock time as an ISO-8601 string without offset, e.g.
/// `2026-10-16T09:30:12.123456`.
pub fn now_iso() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_timestamp_parses_back() {
        let ts = now_iso();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }
}
