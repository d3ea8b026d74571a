//! Unified error handling for pifan
//!
//! This crate provides the single error type used by the fan controller.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;
use std::path::PathBuf;

/// Result type alias using PifanError
pub type Result<T> = std::result::Result<T, PifanError>;

/// Unified error type for all pifan operations
#[derive(thiserror::Error, Debug)]
pub enum PifanError {
    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ============================================================================
    // Temperature Sensor Errors
    // ============================================================================
    #[error("Failed to run sensor command `{command}`: {reason}")]
    SensorCommand {
        command: String,
        reason: String,
    },

    #[error("Failed to read temperature from {path}: {reason}")]
    SensorRead {
        path: PathBuf,
        reason: String,
    },

    #[error("Unparseable temperature reading: {raw:?}")]
    SensorParse {
        raw: String,
    },

    // ============================================================================
    // Output (GPIO) Errors
    // ============================================================================
    #[error("GPIO error on header pin {pin}: {reason}")]
    Gpio {
        pin: u8,
        reason: String,
    },

    #[error("Header pin {0} is not a GPIO line")]
    InvalidPin(u8),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Runtime Errors
    // ============================================================================
    #[error("Failed to install signal handler: {0}")]
    Signal(io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl PifanError {
    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a sensor parse error carrying the raw reading
    pub fn sensor_parse(raw: impl Into<String>) -> Self {
        Self::SensorParse { raw: raw.into() }
    }

    /// Create a GPIO error for a header pin
    pub fn gpio(pin: u8, reason: impl ToString) -> Self {
        Self::Gpio {
            pin,
            reason: reason.to_string(),
        }
    }

    /// Whether this error was raised before any hardware interaction
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::ConfigRead { .. }
                | Self::JsonParse(_)
                | Self::InvalidPin(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PifanError::sensor_parse("temp=??");
        assert_eq!(err.to_string(), "Unparseable temperature reading: \"temp=??\"");

        let err = PifanError::gpio(8, "permission denied");
        assert_eq!(err.to_string(), "GPIO error on header pin 8: permission denied");

        let err = PifanError::invalid_config("check_interval", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for check_interval: must be positive"
        );
    }

    #[test]
    fn test_config_classification() {
        assert!(PifanError::invalid_config("pin", "bad").is_config_error());
        assert!(PifanError::InvalidPin(1).is_config_error());
        assert!(!PifanError::gpio(8, "busy").is_config_error());
        assert!(!PifanError::sensor_parse("x").is_config_error());
    }
}
