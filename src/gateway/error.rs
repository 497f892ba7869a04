//! Errors returned across the maps gateway boundary

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::CoordinateError;

/// Normalised provider status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderStatus {
    Ok,
    /// Valid answer with nothing in it
    EmptyResult,
    RateLimited,
    InvalidRequest,
    Unavailable,
}

impl ProviderStatus {
    /// Collapse the provider's `status` string
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "OK" => ProviderStatus::Ok,
            "ZERO_RESULTS" => ProviderStatus::EmptyResult,
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" | "RESOURCE_EXHAUSTED" => {
                ProviderStatus::RateLimited
            }
            "INVALID_REQUEST"
            | "REQUEST_DENIED"
            | "NOT_FOUND"
            | "MAX_WAYPOINTS_EXCEEDED"
            | "MAX_ROUTE_LENGTH_EXCEEDED" => ProviderStatus::InvalidRequest,
            _ => ProviderStatus::Unavailable,
        }
    }

    /// Collapse a non-success HTTP status
    #[must_use]
    pub fn from_http(status: u16) -> Self {
        match status {
            200..=299 => ProviderStatus::Ok,
            429 => ProviderStatus::RateLimited,
            400..=499 => ProviderStatus::InvalidRequest,
            _ => ProviderStatus::Unavailable,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderStatus::Ok | ProviderStatus::EmptyResult)
    }
}

/// Failure of a gateway operation.
///
/// Every variant carries a message; provider-originated variants also keep
/// the raw provider status string when there was one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("Network error: {message}")]
    NetworkFailure { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        status: Option<String>,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        status: Option<String>,
    },

    #[error("Provider unavailable: {message}")]
    Unavailable {
        message: String,
        status: Option<String>,
    },

    /// Provider answered but without a usable result (e.g. no geocoding match)
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        status: Option<String>,
    },
}

impl GatewayError {
    /// Create a network failure
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    /// Create a provider error carrying the provider status
    pub fn provider<S: Into<String>>(message: S, status: Option<&str>) -> Self {
        Self::Provider {
            message: message.into(),
            status: status.map(str::to_string),
        }
    }

    /// Build the error matching a failed provider status
    pub fn from_status<S: Into<String>>(status: ProviderStatus, message: S, code: Option<&str>) -> Self {
        let message = message.into();
        let status_code = code.map(str::to_string);
        match status {
            ProviderStatus::RateLimited => Self::RateLimited {
                message,
                status: status_code,
            },
            ProviderStatus::InvalidRequest => Self::InvalidRequest {
                message,
                status: status_code,
            },
            ProviderStatus::Unavailable => Self::Unavailable {
                message,
                status: status_code,
            },
            ProviderStatus::Ok | ProviderStatus::EmptyResult => Self::Provider {
                message,
                status: status_code,
            },
        }
    }

    /// Message without the variant prefix
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            GatewayError::MissingApiKey => "API key is missing".to_string(),
            GatewayError::InvalidCoordinate(err) => err.to_string(),
            GatewayError::NetworkFailure { message }
            | GatewayError::RateLimited { message, .. }
            | GatewayError::InvalidRequest { message, .. }
            | GatewayError::Unavailable { message, .. }
            | GatewayError::Provider { message, .. } => message.clone(),
        }
    }

    /// Raw provider status (`"ZERO_RESULTS"`, `"OVER_QUERY_LIMIT"`, ...)
    #[must_use]
    pub fn provider_status(&self) -> Option<&str> {
        match self {
            GatewayError::RateLimited { status, .. }
            | GatewayError::InvalidRequest { status, .. }
            | GatewayError::Unavailable { status, .. }
            | GatewayError::Provider { status, .. } => status.as_deref(),
            _ => None,
        }
    }

    /// Transient failures worth another attempt
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::NetworkFailure { .. }
                | GatewayError::RateLimited { .. }
                | GatewayError::Unavailable { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::MissingApiKey => {
                "Maps API key is not configured. Please set GOOGLE_MAPS_API_KEY.".to_string()
            }
            GatewayError::InvalidCoordinate(err) => format!("Invalid location: {err}"),
            GatewayError::NetworkFailure { .. } | GatewayError::Unavailable { .. } => {
                "Unable to reach the maps service. Please check your internet connection."
                    .to_string()
            }
            GatewayError::RateLimited { .. } => {
                "Too many requests to the maps service. Please try again shortly.".to_string()
            }
            GatewayError::InvalidRequest { message, .. } | GatewayError::Provider { message, .. } => {
                message.clone()
            }
        }
    }
}
