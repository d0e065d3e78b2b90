//! Configuration module for the CRM client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the CRM API (without the `/api` suffix)
    pub api_url: String,
    /// Path to the SQLite file holding the session
    pub session_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Problems found while loading, logged once logging is up
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("CRM_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        let session_path = env::var("CRM_SESSION_PATH")
            .unwrap_or_else(|_| "./data/session.sqlite".to_string())
            .into();

        let log_level = env::var("CRM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("CRM_LOG_JSON")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let mut warnings = Vec::new();
        let request_timeout = match env::var("CRM_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "Invalid CRM_REQUEST_TIMEOUT_SECS {:?}, using {}s",
                    raw, DEFAULT_TIMEOUT_SECS
                ));
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }),
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Self {
            api_url,
            session_path,
            log_level,
            log_json,
            request_timeout,
            warnings,
        }
    }
}

/// Whole seconds, strictly positive.
fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}
