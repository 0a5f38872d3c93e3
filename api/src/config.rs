//! Runtime configuration read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_HF_MODEL_URL, DEFAULT_IMAGE_TIMEOUT_SECS,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT, DEFAULT_TRANSCRIPT_TIMEOUT_SECS,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset (e.g. "info", "mediakit_api=debug,warn").
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Base used to build absolute short URLs in responses.
    pub public_base_url: String,
    /// Where unknown or expired short codes redirect to.
    pub fallback_redirect: String,
    pub cleanup_interval: Duration,
    pub rate_limit_enabled: bool,
    pub hf_access_token: Option<String>,
    pub hf_model_url: String,
    pub transcript_timeout: Duration,
    pub image_timeout: Duration,
    pub max_upload_bytes: usize,
    pub ffmpeg_path: String,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            public_base_url: format!("http://localhost:{}", DEFAULT_PORT),
            fallback_redirect: "/".to_string(),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            rate_limit_enabled: true,
            hf_access_token: None,
            hf_model_url: DEFAULT_HF_MODEL_URL.to_string(),
            transcript_timeout: Duration::from_secs(DEFAULT_TRANSCRIPT_TIMEOUT_SECS),
            image_timeout: Duration::from_secs(DEFAULT_IMAGE_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ffmpeg_path: "ffmpeg".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT", "port number")?.unwrap_or(defaults.port);
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        let cleanup_secs: Option<u64> =
            parse_var(&lookup, "SHORT_LINK_CLEANUP_INTERVAL_SECS", "number of seconds")?;
        let transcript_secs: Option<u64> =
            parse_var(&lookup, "TRANSCRIPT_TIMEOUT_SECS", "number of seconds")?;
        let image_secs: Option<u64> = parse_var(&lookup, "IMAGE_TIMEOUT_SECS", "number of seconds")?;

        Ok(Self {
            port,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            fallback_redirect: lookup("FALLBACK_REDIRECT").unwrap_or(defaults.fallback_redirect),
            cleanup_interval: cleanup_secs
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            rate_limit_enabled: parse_var(&lookup, "RATE_LIMIT_ENABLED", "boolean")?
                .unwrap_or(defaults.rate_limit_enabled),
            hf_access_token: lookup("HF_ACCESS_TOKEN").filter(|v| !v.trim().is_empty()),
            hf_model_url: lookup("HF_MODEL_URL").unwrap_or(defaults.hf_model_url),
            transcript_timeout: transcript_secs
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.transcript_timeout),
            image_timeout: image_secs
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.image_timeout),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", "number of bytes")?
                .unwrap_or(defaults.max_upload_bytes),
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            logging: LoggingConfig {
                level: lookup("LOG_LEVEL").unwrap_or(defaults.logging.level),
                json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map(Some).map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            })
        }
    }
}
