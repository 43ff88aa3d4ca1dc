//! Engine configuration with serde defaults and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    EVENT_CAP, FLEET_SIZE, HEAL_DELAY, INITIAL_COMPLAINTS_BLOCKED, INITIAL_HEALED, MAX_FLEET_SIZE,
    TICK_INTERVAL, TICK_MILLIS, TOTAL_ATMS,
};

/// Tunables for one simulation session. Every field has a default, so `{}`
/// is a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of live-simulated machines, at most [`MAX_FLEET_SIZE`].
    #[serde(default = "EngineConfig::default_node_count")]
    pub node_count: usize,
    /// Reported fleet size. Independent of `node_count`.
    #[serde(default = "EngineConfig::default_total_atms")]
    pub total_atms: u32,
    /// Virtual time units between generated events.
    #[serde(default = "EngineConfig::default_tick_interval")]
    pub tick_interval: u64,
    /// Virtual time units between an event and its heal.
    #[serde(default = "EngineConfig::default_heal_delay")]
    pub heal_delay: u64,
    /// Maximum number of retained events.
    #[serde(default = "EngineConfig::default_event_cap")]
    pub event_cap: usize,
    #[serde(default = "EngineConfig::default_initial_healed")]
    pub initial_healed: u64,
    #[serde(default = "EngineConfig::default_initial_complaints_blocked")]
    pub initial_complaints_blocked: u64,
    /// Drop queued heals when the generator stops.
    #[serde(default)]
    pub cancel_heals_on_stop: bool,
    /// Wall-clock length of one virtual time unit, used for event timestamps
    /// and by the real-time driver.
    #[serde(default = "EngineConfig::default_tick_millis")]
    pub tick_millis: u64,
}

impl EngineConfig {
    const fn default_node_count() -> usize {
        FLEET_SIZE
    }

    const fn default_total_atms() -> u32 {
        TOTAL_ATMS
    }

    const fn default_tick_interval() -> u64 {
        TICK_INTERVAL
    }

    const fn default_heal_delay() -> u64 {
        HEAL_DELAY
    }

    const fn default_event_cap() -> usize {
        EVENT_CAP
    }

    const fn default_initial_healed() -> u64 {
        INITIAL_HEALED
    }

    const fn default_initial_complaints_blocked() -> u64 {
        INITIAL_COMPLAINTS_BLOCKED
    }

    const fn default_tick_millis() -> u64 {
        TICK_MILLIS
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and the matching
    /// validation error when a field is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates its documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count == 0 {
            return Err(ConfigError::EmptyFleet);
        }
        if self.node_count > MAX_FLEET_SIZE {
            return Err(ConfigError::MaxViolation {
                field: "node_count",
                max: u64::try_from(MAX_FLEET_SIZE).unwrap_or(u64::MAX),
                value: u64::try_from(self.node_count).unwrap_or(u64::MAX),
            });
        }
        Self::require_positive("tick_interval", self.tick_interval)?;
        Self::require_positive("heal_delay", self.heal_delay)?;
        Self::require_positive("tick_millis", self.tick_millis)?;
        if self.event_cap == 0 {
            return Err(ConfigError::MinViolation {
                field: "event_cap",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }

    fn require_positive(field: &'static str, value: u64) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::MinViolation {
                field,
                min: 1,
                value,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_count: Self::default_node_count(),
            total_atms: Self::default_total_atms(),
            tick_interval: Self::default_tick_interval(),
            heal_delay: Self::default_heal_delay(),
            event_cap: Self::default_event_cap(),
            initial_healed: Self::default_initial_healed(),
            initial_complaints_blocked: Self::default_initial_complaints_blocked(),
            cancel_heals_on_stop: false,
            tick_millis: Self::default_tick_millis(),
        }
    }
}

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("fleet must contain at least one simulated node")]
    EmptyFleet,
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("{field} must be at most {max} (got {value})")]
    MaxViolation {
        field: &'static str,
        max: u64,
        value: u64,
    },
    #[error("invalid engine config json: {0}")]
    Parse(#[from] serde_json::Error),
}
