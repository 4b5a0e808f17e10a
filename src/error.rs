//! Error types and handling for the charge controller
//!
//! Errors only surface at the construction and configuration boundary and in
//! bench runs. Overheat, battery removal and charge timeout are ordinary
//! operating conditions and are modelled as
//! [`Interruption`](crate::controller::Interruption), not as errors.

use thiserror::Error;

/// Result type alias for charger operations
pub type Result<T> = std::result::Result<T, ChargerError>;

/// Main error type for the charger
#[derive(Debug, Error)]
pub enum ChargerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization errors (snapshots, session stats)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A bounded run did not reach the expected state in time
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl ChargerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        ChargerError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ChargerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        ChargerError::Serialization {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        ChargerError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        ChargerError::Generic {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ChargerError {
    fn from(err: serde_json::Error) -> Self {
        ChargerError::serialization(err.to_string())
    }
}
