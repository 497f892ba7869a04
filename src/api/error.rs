use axum::extract::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use crate::HalfwayError;
use crate::gateway::GatewayError;
use crate::geolocation::LocationError;

/// Error returned by every API handler
#[derive(Debug)]
pub struct ApiError(pub HalfwayError);

impl ApiError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self(HalfwayError::state(message))
    }

    /// Body that is not valid JSON or does not fit the request type,
    /// including out-of-range coordinates
    pub fn rejected(rejection: JsonRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }

    /// Stable machine-readable code and HTTP status
    #[must_use]
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            HalfwayError::Gateway(err) => match err {
                GatewayError::MissingApiKey => (StatusCode::SERVICE_UNAVAILABLE, "missing_api_key"),
                GatewayError::InvalidCoordinate(_) => (StatusCode::BAD_REQUEST, "invalid_coordinate"),
                GatewayError::NetworkFailure { .. } => (StatusCode::BAD_GATEWAY, "network_failure"),
                GatewayError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                GatewayError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
                GatewayError::Unavailable { .. } => (StatusCode::BAD_GATEWAY, "provider_unavailable"),
                GatewayError::Provider { .. } => (StatusCode::NOT_FOUND, "provider_error"),
            },
            HalfwayError::Location(err) => match err {
                LocationError::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied"),
                LocationError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "location_unavailable"),
                LocationError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "location_timeout"),
            },
            HalfwayError::InvalidCoordinate(_) => (StatusCode::BAD_REQUEST, "invalid_coordinate"),
            HalfwayError::State { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
            HalfwayError::Config { .. } | HalfwayError::Io { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl<E: Into<HalfwayError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let provider_status = match &self.0 {
            HalfwayError::Gateway(err) => err.provider_status().map(str::to_string),
            _ => None,
        };

        let body = Json(json!({
            "code": code,
            "error": self.0.user_message(),
            "provider_status": provider_status,
        }));

        (status, body).into_response()
    }
}
