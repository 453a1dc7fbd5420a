//! Runtime configuration validated at startup.
//!
//! Values arrive from the command line / environment (see the `roomcast-server`
//! binary) and are checked here so that a misconfigured server refuses to start.

use std::time::Duration;

use thiserror::Error;

/// Configuration errors (fatal at startup)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("inactivity threshold must be positive, got {0} seconds")]
    NonPositiveThreshold(i64),

    #[error("inactivity check interval must be positive, got {0} seconds")]
    NonPositiveCheckInterval(i64),

    #[error("{name} timeout must be positive")]
    ZeroTimeout { name: &'static str },
}

/// Inactivity sweeper settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityConfig {
    threshold: Duration,
    check_interval: Duration,
}

impl InactivityConfig {
    /// Validate and build the sweeper settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either value is zero or negative.
    pub fn new(threshold_seconds: i64, check_interval_seconds: i64) -> Result<Self, ConfigError> {
        if threshold_seconds <= 0 {
            return Err(ConfigError::NonPositiveThreshold(threshold_seconds));
        }
        if check_interval_seconds <= 0 {
            return Err(ConfigError::NonPositiveCheckInterval(
                check_interval_seconds,
            ));
        }
        Ok(Self {
            threshold: Duration::from_secs(threshold_seconds.unsigned_abs()),
            check_interval: Duration::from_secs(check_interval_seconds.unsigned_abs()),
        })
    }

    /// How long a user may stay silent before being considered inactive
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn threshold_millis(&self) -> i64 {
        i64::try_from(self.threshold.as_millis()).unwrap_or(i64::MAX)
    }

    /// Sweep period
    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }
}

/// Timeouts applied at the collaborator and transport boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Message log / presence store calls
    pub collaborator: Duration,
    /// A single send to one session
    pub send: Duration,
}

impl Timeouts {
    pub fn from_millis(collaborator_ms: u64, send_ms: u64) -> Result<Self, ConfigError> {
        if collaborator_ms == 0 {
            return Err(ConfigError::ZeroTimeout {
                name: "collaborator",
            });
        }
        if send_ms == 0 {
            return Err(ConfigError::ZeroTimeout { name: "send" });
        }
        Ok(Self {
            collaborator: Duration::from_millis(collaborator_ms),
            send: Duration::from_millis(send_ms),
        })
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            collaborator: Duration::from_secs(2),
            send: Duration::from_secs(1),
        }
    }
}
