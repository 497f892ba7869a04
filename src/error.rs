//! Error types and handling for the halfway application

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::geolocation::LocationError;
use crate::models::CoordinateError;

/// Main error type for the halfway application
#[derive(Error, Debug)]
pub enum HalfwayError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Maps provider errors
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Device location errors
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    /// An operation needs session state that is not there yet
    #[error("Invalid state: {message}")]
    State { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl HalfwayError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new state error
    pub fn state<S: Into<String>>(message: S) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            HalfwayError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            HalfwayError::Gateway(err) => err.user_message(),
            HalfwayError::Location(err) => err.user_message(),
            HalfwayError::InvalidCoordinate(err) => format!("Invalid location: {err}"),
            HalfwayError::State { message } => message.clone(),
            HalfwayError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
