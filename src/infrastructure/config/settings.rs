//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; API credentials come only from
//! the environment (`LATOKEN_API_KEY`/`LATOKEN_API_SECRET` and
//! `GATEIO_API_KEY`/`GATEIO_API_SECRET`), optionally via a `.env` file.
//!
//! # Example
//!
//! ```no_run
//! use exchange_bridge::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::http::HttpConfig;
use super::logging::LoggingConfig;
use super::stream::StreamConfig;
use crate::error::{ConfigError, Result};

#[cfg(feature = "gateio")]
use crate::adapter::outbound::gateio::GateioConfig;
#[cfg(feature = "latoken")]
use crate::adapter::outbound::latoken::LatokenConfig;

/// Top-level configuration.
///
/// Every section is optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[cfg(feature = "latoken")]
    #[serde(default)]
    pub latoken: LatokenConfig,
    #[cfg(feature = "gateio")]
    #[serde(default)]
    pub gateio: GateioConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Credentials are read from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with(content, |key| std::env::var(key).ok())
    }

    /// Parse configuration, resolving credentials through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    #[cfg_attr(not(any(feature = "latoken", feature = "gateio")), allow(unused_variables))]
    pub fn parse_toml_with(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        #[cfg_attr(not(any(feature = "latoken", feature = "gateio")), allow(unused_mut))]
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // Never from the config file.
        #[cfg(feature = "latoken")]
        {
            config.latoken.credentials = LatokenConfig::credentials_from(&lookup);
        }
        #[cfg(feature = "gateio")]
        {
            config.gateio.credentials = GateioConfig::credentials_from(&lookup);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "logging.level" }.into());
        }

        #[cfg(feature = "latoken")]
        {
            validate_url("latoken.api_url", &self.latoken.api_url)?;
            validate_http(&self.latoken.http)?;
        }

        #[cfg(feature = "gateio")]
        {
            validate_url("gateio.ws_url", &self.gateio.ws_url)?;
            validate_url("gateio.api_url", &self.gateio.api_url)?;
            if self.gateio.snapshot_limit == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "snapshot_limit",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
            validate_http(&self.gateio.http)?;
            validate_stream(&self.gateio.stream)?;
        }

        Ok(())
    }

    /// Install the global tracing subscriber.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg_attr(not(any(feature = "latoken", feature = "gateio")), allow(dead_code))]
fn validate_url(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;
    Ok(())
}

#[cfg_attr(not(any(feature = "latoken", feature = "gateio")), allow(dead_code))]
fn validate_http(http: &HttpConfig) -> Result<()> {
    if http.timeout_ms == 0 {
        return Err(ConfigError::InvalidValue {
            field: "timeout_ms",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if http.connect_timeout_ms == 0 {
        return Err(ConfigError::InvalidValue {
            field: "connect_timeout_ms",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if http.retry_max_attempts == 0 {
        return Err(ConfigError::InvalidValue {
            field: "retry_max_attempts",
            reason: "must be at least 1".to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg_attr(not(feature = "gateio"), allow(dead_code))]
fn validate_stream(stream: &StreamConfig) -> Result<()> {
    if stream.depth == 0 {
        return Err(ConfigError::InvalidValue {
            field: "depth",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if stream.channel_capacity == 0 {
        return Err(ConfigError::InvalidValue {
            field: "channel_capacity",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if stream.snapshot_timeout_ms == 0 {
        return Err(ConfigError::InvalidValue {
            field: "snapshot_timeout_ms",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }

    let reconnection = &stream.reconnection;
    if reconnection.initial_delay_ms == 0 {
        return Err(ConfigError::InvalidValue {
            field: "initial_delay_ms",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if reconnection.max_delay_ms < reconnection.initial_delay_ms {
        return Err(ConfigError::InvalidValue {
            field: "max_delay_ms",
            reason: "must be >= initial_delay_ms".to_string(),
        }
        .into());
    }
    if reconnection.backoff_multiplier < 1.0 {
        return Err(ConfigError::InvalidValue {
            field: "backoff_multiplier",
            reason: "must be >= 1.0".to_string(),
        }
        .into());
    }
    if reconnection.max_consecutive_failures == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_consecutive_failures",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    Ok(())
}
