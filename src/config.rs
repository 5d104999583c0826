//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default request timeout for backend calls.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human-readable lines.
    Pretty,
    /// Flattened JSON events, one per line.
    Json,
}

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Serena backend, without trailing slash
    pub api_base_url: String,
    /// File holding the persisted session (token, user, selected senior)
    pub state_file: PathBuf,
    /// Per-request timeout for backend calls
    pub http_timeout: Duration,
    /// Log output format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("SERENA_API_URL")
            .or_else(|_| env::var("EXPO_PUBLIC_API_URL"))
            .map_err(|_| ConfigError::Missing("SERENA_API_URL"))?;
        let api_base_url = normalize_base_url(&api_base_url)?;

        let state_file = match env::var("SERENA_STATE_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => default_state_file()?,
        };

        let http_timeout = env::var("SERENA_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        let log_format = match env::var("SERENA_LOG_FORMAT") {
            Ok(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            api_base_url,
            state_file,
            http_timeout,
            log_format,
        })
    }

    /// Config pointing at a local backend, for tests.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            state_file: env::temp_dir().join("serena-care-test-session.json"),
            http_timeout: Duration::from_secs(5),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Trim whitespace and trailing slashes; reject anything that isn't http(s).
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            name: "SERENA_API_URL",
            reason: format!("expected an http(s) URL, got {:?}", raw),
        });
    }
    Ok(url.to_string())
}

fn default_state_file() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("serena-care").join("session.json"))
        .ok_or(ConfigError::Missing("SERENA_STATE_FILE"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
