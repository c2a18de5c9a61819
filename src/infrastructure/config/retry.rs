//! Backoff, readiness and HTTP client retry configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Exponential backoff between retries.
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    /// Delay after the first failure (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each failure.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Add up to 20% random jitter to each delay.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000 // 10 seconds
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> bool {
    true
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl BackoffConfig {
    pub(crate) fn validate(&self, section: &'static str) -> Result<(), ConfigError> {
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: section,
                reason: "max_delay_ms must be >= initial_delay_ms".to_string(),
            });
        }
        if !(self.backoff_multiplier >= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: section,
                reason: "backoff_multiplier must be >= 1.0".to_string(),
            });
        }
        Ok(())
    }
}

/// Database readiness poll settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessConfig {
    /// Probes against the primary endpoint before falling back.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Bound on a single connection attempt (milliseconds).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Overall deadline for the primary poll; unset means attempts only.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

const fn default_max_attempts() -> u32 {
    30
}

const fn default_probe_timeout_ms() -> u64 {
    2_000
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            probe_timeout_ms: default_probe_timeout_ms(),
            deadline_secs: None,
            backoff: BackoffConfig::default(),
        }
    }
}

impl ReadinessConfig {
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe_timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        self.backoff.validate("readiness.backoff")
    }
}

/// Retry policy of the dashboard's API client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Retries after the first failed request.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-request timeout (milliseconds).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

const fn default_max_retries() -> u32 {
    5
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            request_timeout_ms: default_request_timeout_ms(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        self.backoff.validate("client.backoff")
    }
}
