//! Runtime configuration.
//!
//! Settings come from `DASHBOARD_*` environment variables, optionally
//! seeded from a `.env` file.  Unset or unparseable values fall back to
//! the defaults below.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::engine::DEFAULT_TOP_PERFORMERS;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub backend_url: String,
    pub bind_addr: String,
    /// Per-request timeout for backend calls.
    pub timeout: Duration,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
    /// Leaderboard length on the admin dashboard.
    pub top_performers: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_json: false,
            top_performers: DEFAULT_TOP_PERFORMERS,
        }
    }
}

impl DashboardConfig {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            backend_url: lookup("DASHBOARD_BACKEND_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.backend_url),
            bind_addr: lookup("DASHBOARD_BIND_ADDR")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.bind_addr),
            timeout: parsed(&lookup, "DASHBOARD_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            log_json: lookup("DASHBOARD_LOG_JSON")
                .and_then(|s| parse_bool("DASHBOARD_LOG_JSON", &s))
                .unwrap_or(defaults.log_json),
            top_performers: parsed(&lookup, "DASHBOARD_TOP_PERFORMERS").unwrap_or(defaults.top_performers),
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(key, value = raw, "ignoring unparseable setting");
            None
        }
    }
}
