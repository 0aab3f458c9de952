use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::messages::Locale;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const HEALTH_CHECK_PATH: &str = "/health";
pub const ANALYZE_PATH: &str = "/api/v1/health/analyze";
pub const RECORDS_PATH: &str = "/api/v1/health/records";

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout_ms: u64,
    pub probe_timeout_ms: u64,
    /// Declared for parity with the backend's settings. Submissions are never
    /// retried automatically; see `AnalysisRequestClient::submit`.
    pub retry_attempts: u32,
    pub poll_interval_ms: u64,
    pub locale: Locale,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_url: env::var("HEALTH_API_BASE_URL").unwrap_or(defaults.base_url),
            timeout_ms: parse_var("HEALTH_API_TIMEOUT_MS", defaults.timeout_ms)?,
            probe_timeout_ms: parse_var("HEALTH_API_PROBE_TIMEOUT_MS", defaults.probe_timeout_ms)?,
            retry_attempts: parse_var("HEALTH_API_RETRY_ATTEMPTS", defaults.retry_attempts)?,
            poll_interval_ms: parse_var("HEALTH_API_POLL_INTERVAL_MS", defaults.poll_interval_ms)?,
            locale: match env::var("HEALTH_CLIENT_LOCALE") {
                Ok(raw) => raw
                    .parse()
                    .with_context(|| format!("HEALTH_CLIENT_LOCALE has unsupported value {raw:?}"))?,
                Err(_) => defaults.locale,
            },
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Joins an endpoint path onto the base URL, tolerating a trailing slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn health_url(&self) -> String {
        self.endpoint(HEALTH_CHECK_PATH)
    }

    pub fn analyze_url(&self) -> String {
        self.endpoint(ANALYZE_PATH)
    }

    pub fn records_url(&self, limit: usize) -> String {
        format!("{}?limit={}", self.endpoint(RECORDS_PATH), limit)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            probe_timeout_ms: 5_000,
            retry_attempts: 3,
            poll_interval_ms: 30_000,
            locale: Locale::En,
            log_level: "health_client=info".to_string(),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a valid number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}
