//! Engine configuration.
//!
//! All settings come from environment variables with sensible defaults;
//! the engine runs with no configuration at all.
//!
//! # Environment Variables
//!
//! - `SWEEP_INTERVAL_SECS`: Expiration sweep period (default: 3600)
//! - `SWEEP_ENABLED`: Set to `false` to disable the sweep (default: true)
//! - `RUST_LOG`: Log level (default: info)

use std::time::Duration;

use thiserror::Error;

/// Default expiration sweep period.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held an unparseable value.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// The offending value.
        value: String,
    },
}

/// Parsed engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often the expiration sweep runs.
    pub sweep_interval: Duration,
    /// Whether the sweep timer is started at all.
    pub sweep_enabled: bool,
}

impl EngineConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let sweep_interval = match std::env::var("SWEEP_INTERVAL_SECS") {
            Ok(value) => {
                let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "SWEEP_INTERVAL_SECS".to_string(),
                    value,
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        };

        let sweep_enabled = std::env::var("SWEEP_ENABLED")
            .map(|v| v != "false")
            .unwrap_or(true);

        Ok(Self {
            sweep_interval,
            sweep_enabled,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            sweep_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
        assert!(config.sweep_enabled);
    }
}
