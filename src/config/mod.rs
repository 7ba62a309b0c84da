//! Configuration handling for the analysis service and CLI.
//!
//! Everything is read from environment variables with development defaults.
//! Which analysis strategies are available (remote service, direct model
//! call) is decided here, from the presence of `ANALYZE_ENDPOINT` and
//! `GEMINI_API_KEY`, and handed to the fallback chain explicitly.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable names. Public so tests and tooling can refer to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_ANALYZE_ENDPOINT: &str = "ANALYZE_ENDPOINT";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_MODEL_TIMEOUT_SECS: &str = "MODEL_TIMEOUT_SECS";
pub const ENV_MOCK_DELAY_MS: &str = "MOCK_DELAY_MS";
pub const ENV_ALLOW_PRIVATE_HOSTS: &str = "ALLOW_PRIVATE_HOSTS";
pub const ENV_RATE_LIMIT_PER_MINUTE: &str = "RATE_LIMIT_PER_MINUTE";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 20;
const DEFAULT_MOCK_DELAY_MS: u64 = 1000;
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 30;

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    gemini_api_key: Option<String>,
    gemini_model: String,
    gemini_base_url: String,
    analyze_endpoint: Option<Url>,
    fetch_timeout: Duration,
    model_timeout: Duration,
    mock_delay: Duration,
    allow_private_hosts: bool,
    rate_limit_per_minute: u32,
    log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            analyze_endpoint: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            mock_delay: Duration::from_millis(DEFAULT_MOCK_DELAY_MS),
            allow_private_hosts: false,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            log_json: false,
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    ///
    /// Blank values are treated as absent. Values that are present but
    /// cannot be parsed produce a [`ConfigError`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let analyze_endpoint = match var(ENV_ANALYZE_ENDPOINT) {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                field: ENV_ANALYZE_ENDPOINT,
                reason: e.to_string(),
            })?),
            None => None,
        };

        let log_json = var(ENV_LOG_FORMAT).is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Self {
            bind_addr: var(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            gemini_api_key: var(ENV_GEMINI_API_KEY),
            gemini_model: var(ENV_GEMINI_MODEL).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: var(ENV_GEMINI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            analyze_endpoint,
            fetch_timeout: Duration::from_secs(parse_var(
                ENV_FETCH_TIMEOUT_SECS,
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            model_timeout: Duration::from_secs(parse_var(
                ENV_MODEL_TIMEOUT_SECS,
                DEFAULT_MODEL_TIMEOUT_SECS,
            )?),
            mock_delay: Duration::from_millis(parse_var(ENV_MOCK_DELAY_MS, DEFAULT_MOCK_DELAY_MS)?),
            allow_private_hosts: parse_bool(ENV_ALLOW_PRIVATE_HOSTS, false)?,
            rate_limit_per_minute: parse_var(
                ENV_RATE_LIMIT_PER_MINUTE,
                DEFAULT_RATE_LIMIT_PER_MINUTE,
            )?,
            log_json,
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Credential for the generative model. `None` disables direct model calls.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key.as_deref()
    }
    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }
    pub fn gemini_base_url(&self) -> &str {
        &self.gemini_base_url
    }
    /// Remote analysis service. `None` disables the remote strategy.
    pub fn analyze_endpoint(&self) -> Option<&Url> {
        self.analyze_endpoint.as_ref()
    }
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    pub fn model_timeout(&self) -> Duration {
        self.model_timeout
    }
    /// Artificial latency of the placeholder strategy.
    pub fn mock_delay(&self) -> Duration {
        self.mock_delay
    }
    /// Whether loopback and private network hosts may be fetched.
    pub fn allow_private_hosts(&self) -> bool {
        self.allow_private_hosts
    }
    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }
    pub fn log_json(&self) -> bool {
        self.log_json
    }

    pub fn with_gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    pub fn with_gemini_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.gemini_base_url = base_url.into();
        self
    }

    pub fn with_analyze_endpoint(mut self, endpoint: Url) -> Self {
        self.analyze_endpoint = Some(endpoint);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_mock_delay(mut self, delay: Duration) -> Self {
        self.mock_delay = delay;
        self
    }

    pub fn with_private_hosts_allowed(mut self, allowed: bool) -> Self {
        self.allow_private_hosts = allowed;
        self
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = var(key) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: key,
            reason: format!("expected a boolean, got '{raw}'"),
        }),
    }
}
