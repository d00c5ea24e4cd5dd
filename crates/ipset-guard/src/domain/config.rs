//! IP set mutation configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use ipset_guard::domain::IpSetConfigBuilder;
//!
//! let config = IpSetConfigBuilder::new()
//!     .max_retries(5)
//!     .backoff_ms(50, 150)
//!     .build()
//!     .expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::entities::Scope;

/// Hard ceiling on configurable retries
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("max_retries {0} exceeds limit {}", MAX_RETRIES_LIMIT)]
    TooManyRetries(u32),

    #[error("invalid backoff window: min {min_ms}ms > max {max_ms}ms")]
    InvalidBackoff { min_ms: u64, max_ms: u64 },

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}

/// Retry budget and backoff window for version conflicts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (3 means 4 attempts in total)
    pub max_retries: u32,
    /// Lower bound of the backoff sleep, inclusive
    pub backoff_min_ms: u64,
    /// Upper bound of the backoff sleep, inclusive
    pub backoff_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_min_ms: 100,
            backoff_max_ms: 200,
        }
    }
}

impl RetryConfig {
    pub fn backoff_min(&self) -> Duration {
        Duration::from_millis(self.backoff_min_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::TooManyRetries(self.max_retries));
        }
        if self.backoff_min_ms > self.backoff_max_ms {
            return Err(ConfigError::InvalidBackoff {
                min_ms: self.backoff_min_ms,
                max_ms: self.backoff_max_ms,
            });
        }
        Ok(())
    }
}

/// Top-level configuration for [`crate::service::IpSetService`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpSetConfig {
    /// Scope every target IP set lives in
    pub scope: Scope,
    pub retry: RetryConfig,
    /// Skip the conditional write when a mutation leaves the list unchanged.
    /// Off by default: every attempt performs exactly one read and one write.
    pub skip_noop_writes: bool,
}

impl IpSetConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()
    }

    /// Load from environment variables on top of the defaults.
    ///
    /// Recognized keys: `IPSET_SCOPE`, `IPSET_MAX_RETRIES`,
    /// `IPSET_BACKOFF_MIN_MS`, `IPSET_BACKOFF_MAX_MS`, `IPSET_SKIP_NOOP_WRITES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(scope) = lookup("IPSET_SCOPE") {
            config.scope = scope.parse()?;
        }
        if let Some(value) = lookup("IPSET_MAX_RETRIES") {
            config.retry.max_retries = parse_env("IPSET_MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("IPSET_BACKOFF_MIN_MS") {
            config.retry.backoff_min_ms = parse_env("IPSET_BACKOFF_MIN_MS", &value)?;
        }
        if let Some(value) = lookup("IPSET_BACKOFF_MAX_MS") {
            config.retry.backoff_max_ms = parse_env("IPSET_BACKOFF_MAX_MS", &value)?;
        }
        if let Some(value) = lookup("IPSET_SKIP_NOOP_WRITES") {
            config.skip_noop_writes = value == "1" || value.eq_ignore_ascii_case("true");
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Builder for IpSetConfig with validation
#[derive(Default)]
pub struct IpSetConfigBuilder {
    scope: Option<Scope>,
    max_retries: Option<u32>,
    backoff: Option<(u64, u64)>,
    skip_noop_writes: Option<bool>,
}

impl IpSetConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the inclusive backoff window in milliseconds
    pub fn backoff_ms(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.backoff = Some((min_ms, max_ms));
        self
    }

    pub fn skip_noop_writes(mut self, skip: bool) -> Self {
        self.skip_noop_writes = Some(skip);
        self
    }

    pub fn build(self) -> Result<IpSetConfig, ConfigError> {
        let defaults = IpSetConfig::default();
        let (backoff_min_ms, backoff_max_ms) = self.backoff.unwrap_or((
            defaults.retry.backoff_min_ms,
            defaults.retry.backoff_max_ms,
        ));

        let config = IpSetConfig {
            scope: self.scope.unwrap_or(defaults.scope),
            retry: RetryConfig {
                max_retries: self.max_retries.unwrap_or(defaults.retry.max_retries),
                backoff_min_ms,
                backoff_max_ms,
            },
            skip_noop_writes: self.skip_noop_writes.unwrap_or(defaults.skip_noop_writes),
        };

        config.validate()?;
        Ok(config)
    }
}
