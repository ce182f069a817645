use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use utils_trace::LogFormat;

pub const DEFAULT_SOURCE_URL: &str = "https://byte-labs.xyz/.netlify/functions/2hot";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub source_url: String,
    pub store_path: PathBuf,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value `{value}`: {message}")]
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "TOKENS_PORT", "3000")?,
            source_url: try_load(&lookup, "TOKENS_SOURCE_URL", DEFAULT_SOURCE_URL)?,
            store_path: try_load(&lookup, "TOKENS_STORE_PATH", "tokens.xml")?,
            poll_interval: load_secs(&lookup, "TOKENS_POLL_INTERVAL_SECS", "60")?,
            fetch_timeout: load_secs(&lookup, "TOKENS_FETCH_TIMEOUT_SECS", "5")?,
            log_level: try_load(&lookup, "TOKENS_LOG_LEVEL", "info")?,
            log_format: try_load(&lookup, "TOKENS_LOG_FORMAT", "compact")?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());

    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        message: e.to_string(),
        value,
    })
}

fn load_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<Duration, ConfigError> {
    let secs: u64 = try_load(lookup, key, default)?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: secs.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    Ok(Duration::from_secs(secs))
}
