//! Runtime configuration for the status tracker.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of the environment variables read by [`TrackerConfig::from_env`].
pub const ENV_PREFIX: &str = "BOT_STATUS_";

/// Upper bound for the interval and timeout settings, one week.
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Upper bound for the retention window, one year.
pub const MAX_RETENTION_HOURS: u32 = 365 * 24;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable could not be parsed as a positive integer.
    #[error("invalid value '{value}' for {key}, expected a positive integer")]
    InvalidNumber {
        /// Environment variable name.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// An interval or window is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// A setting exceeds its upper bound.
    #[error("{setting} must not exceed {max}")]
    TooLarge {
        /// Setting name.
        setting: &'static str,
        /// Largest accepted value.
        max: u64,
    },

    /// The provider base URL is empty.
    #[error("provider base URL must not be empty")]
    EmptyProviderUrl,
}

/// Scheduling and retention settings.
///
/// Defaults poll the provider every 3 seconds with a 10 second timeout and
/// expire records hourly once they are 24 hours old.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Seconds between reconciler ticks.
    pub sync_interval_secs: u64,
    /// Seconds before a provider request is abandoned.
    pub provider_timeout_secs: u64,
    /// Seconds between reaper ticks.
    pub cleanup_interval_secs: u64,
    /// Maximum record age in hours.
    pub retention_hours: u32,
    /// Base URL of the external automation service.
    pub provider_base_url: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: 3,
            provider_timeout_secs: 10,
            cleanup_interval_secs: 3600,
            retention_hours: 24,
            provider_base_url: "http://host.docker.internal:8001".to_owned(),
        }
    }
}

impl TrackerConfig {
    /// Loads configuration from `BOT_STATUS_*` environment variables.
    ///
    /// Unset variables keep their default value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed or the resulting
    /// configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// `lookup` receives full variable names such as
    /// `BOT_STATUS_SYNC_INTERVAL_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed or the resulting
    /// configuration is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = read_number(&lookup, "SYNC_INTERVAL_SECS")? {
            config.sync_interval_secs = value;
        }
        if let Some(value) = read_number(&lookup, "PROVIDER_TIMEOUT_SECS")? {
            config.provider_timeout_secs = value;
        }
        if let Some(value) = read_number(&lookup, "CLEANUP_INTERVAL_SECS")? {
            config.cleanup_interval_secs = value;
        }
        if let Some(value) = read_number(&lookup, "RETENTION_HOURS")? {
            config.retention_hours = value;
        }
        if let Some(value) = lookup(&format!("{ENV_PREFIX}PROVIDER_URL")) {
            config.provider_base_url = value.trim().to_owned();
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets the reconciler tick.
    #[must_use]
    pub const fn with_sync_interval_secs(mut self, secs: u64) -> Self {
        self.sync_interval_secs = secs;
        self
    }

    /// Sets the provider timeout.
    #[must_use]
    pub const fn with_provider_timeout_secs(mut self, secs: u64) -> Self {
        self.provider_timeout_secs = secs;
        self
    }

    /// Sets the reaper tick.
    #[must_use]
    pub const fn with_cleanup_interval_secs(mut self, secs: u64) -> Self {
        self.cleanup_interval_secs = secs;
        self
    }

    /// Sets the retention window.
    #[must_use]
    pub const fn with_retention_hours(mut self, hours: u32) -> Self {
        self.retention_hours = hours;
        self
    }

    /// Sets the provider base URL.
    #[must_use]
    pub fn with_provider_base_url(mut self, url: impl Into<String>) -> Self {
        self.provider_base_url = url.into();
        self
    }

    /// Checks that every interval and window is positive and bounded.
    ///
    /// Intervals and the timeout are capped at [`MAX_INTERVAL_SECS`], the
    /// retention window at [`MAX_RETENTION_HOURS`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] for a zero setting,
    /// [`ConfigError::TooLarge`] for one past its bound and
    /// [`ConfigError::EmptyProviderUrl`] for a blank URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_secs("sync interval", self.sync_interval_secs)?;
        check_secs("provider timeout", self.provider_timeout_secs)?;
        check_secs("cleanup interval", self.cleanup_interval_secs)?;
        if self.retention_hours == 0 {
            return Err(ConfigError::Zero("retention window"));
        }
        if self.retention_hours > MAX_RETENTION_HOURS {
            return Err(ConfigError::TooLarge {
                setting: "retention window",
                max: u64::from(MAX_RETENTION_HOURS),
            });
        }
        if self.provider_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyProviderUrl);
        }
        Ok(())
    }

    /// Returns the reconciler tick.
    #[must_use]
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Returns the provider timeout.
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Returns the reaper tick.
    #[must_use]
    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Returns the retention window.
    #[must_use]
    pub fn retention(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.retention_hours))
    }
}

const fn check_secs(setting: &'static str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Zero(setting));
    }
    if secs > MAX_INTERVAL_SECS {
        return Err(ConfigError::TooLarge {
            setting,
            max: MAX_INTERVAL_SECS,
        });
    }
    Ok(())
}

fn read_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    suffix: &str,
) -> Result<Option<T>, ConfigError> {
    let key = format!("{ENV_PREFIX}{suffix}");
    let Some(raw) = lookup(&key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
}
