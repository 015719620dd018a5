//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold tunables shared by the store, the tick session and the creation
//!   boundary.
//! - Parse caller-supplied JSON with every field defaulted.
//!
//! # Invariants
//! - `storage_key` is non-empty after trimming.
//! - `tick_interval_ms` is greater than zero.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_STORAGE_KEY: &str = "countdown-timers";
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_MIN_BIRTH_YEAR: i32 = 1900;

/// Configuration parse/validation failures.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EmptyStorageKey,
    ZeroTickInterval,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::EmptyStorageKey => write!(f, "storage_key cannot be empty"),
            Self::ZeroTickInterval => write!(f, "tick_interval_ms must be greater than zero"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Tunables for one countdown session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Key of the persisted slot holding the serialized timer list.
    pub storage_key: String,
    /// Cadence of each mounted card's tick.
    pub tick_interval_ms: u64,
    /// Earliest accepted birth year at the creation boundary.
    pub min_birth_year: i32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            min_birth_year: DEFAULT_MIN_BIRTH_YEAR,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    ///
    /// # Errors
    /// - Returns [`ConfigError::Parse`] for malformed JSON.
    /// - Returns a validation error when an invariant is broken.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_STORAGE_KEY};

    #[test]
    fn empty_object_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.tick_interval_ms, 1_000);
        assert_eq!(config.min_birth_year, 1900);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = CoreConfig::from_json_str(r#"{"storage_key":"family"}"#).unwrap();
        assert_eq!(config.storage_key, "family");
        assert_eq!(config.tick_interval_ms, 1_000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"tick_interval_ms":0}"#),
            Err(ConfigError::ZeroTickInterval)
        ));
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"storage_key":"  "}"#),
            Err(ConfigError::EmptyStorageKey)
        ));
        assert!(matches!(
            CoreConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
