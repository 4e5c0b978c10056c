//! Agent configuration and session policies.

use std::{str::FromStr, time::Duration};

use thiserror::Error;

/// Default pause after a successful operation.
pub const DEFAULT_CYCLE_PAUSE: Duration = Duration::from_secs(3);

/// Default pause after a failed operation.
pub const DEFAULT_ERROR_COOLDOWN: Duration = Duration::from_secs(5);

/// What to do when the broker's login reply carries a rejected status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPolicy {
    /// Treat any login reply as success.
    #[default]
    Ignore,
    /// Stop the session.
    Halt,
}

impl FromStr for LoginPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "halt" => Ok(Self::Halt),
            other => Err(ConfigError::UnknownPolicy { value: other.to_string() }),
        }
    }
}

/// What to do when a reply's clock is present but not a usable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedClockPolicy {
    /// Skip the merge and log a warning.
    #[default]
    Ignore,
    /// Fail the exchange. Login replies are exempt: they always establish.
    Reject,
}

impl FromStr for MalformedClockPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(ConfigError::UnknownPolicy { value: other.to_string() }),
        }
    }
}

/// Policies applied by [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionPolicy {
    /// Login rejection handling.
    pub login: LoginPolicy,
    /// Malformed clock handling.
    pub malformed_clock: MalformedClockPolicy,
}

/// [`SessionAgent`](crate::SessionAgent) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// Pause after a successful operation.
    pub cycle_pause: Duration,
    /// Pause after a failed operation. Must exceed `cycle_pause`.
    pub error_cooldown: Duration,
    /// Session policies.
    pub policy: SessionPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cycle_pause: DEFAULT_CYCLE_PAUSE,
            error_cooldown: DEFAULT_ERROR_COOLDOWN,
            policy: SessionPolicy::default(),
        }
    }
}

impl AgentConfig {
    /// Check the pauses are consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.error_cooldown <= self.cycle_pause {
            return Err(ConfigError::CooldownTooShort {
                cooldown: self.error_cooldown,
                pause: self.cycle_pause,
            });
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Error cooldown is not longer than the cycle pause.
    #[error("error cooldown {cooldown:?} must be longer than cycle pause {pause:?}")]
    CooldownTooShort {
        /// Configured cooldown.
        cooldown: Duration,
        /// Configured pause.
        pause: Duration,
    },

    /// Policy name not recognized.
    #[error("unknown policy: {value}")]
    UnknownPolicy {
        /// The unrecognized value.
        value: String,
    },

    /// A catalog list is empty.
    #[error("catalog list is empty: {list}")]
    EmptyCatalog {
        /// Which list.
        list: &'static str,
    },
}
