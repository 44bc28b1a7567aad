//! API error types and responses.
//!
//! This module defines the standard error format for all API responses. The
//! cookie store adapter's wire shape is fixed: a flat `{"error": "<msg>"}`
//! body with status 500, so the `Display` text of each variant is exactly
//! what goes on the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use sessrelay_auth::AuthError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The relay request body could not be parsed.
    #[error("{0}")]
    InvalidRequest(String),

    /// The cookie jar is not accessible in this execution context (the
    /// supplied name/value cannot form a `Set-Cookie` header).
    #[error("{0}")]
    StoreUnavailable(String),

    /// Invalid request parameters outside the relay surface.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The auth service call failed or returned no session.
    #[error("upstream auth failure")]
    UpstreamAuthFailure,

    /// The backend denied access to the requested rows.
    #[error("forbidden")]
    Forbidden,

    /// The relay HTTP call failed.
    #[error("{0}")]
    NetworkFailure(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    ///
    /// Adapter-level failures (`InvalidRequest`, `StoreUnavailable`,
    /// `NetworkFailure`) are always 500: the relay contract has no 4xx
    /// surface.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamAuthFailure => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidRequest(_)
            | Self::StoreUnavailable(_)
            | Self::NetworkFailure(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the taxonomy code for this error, used in logs.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::BadRequest(_) => "bad_request",
            Self::UpstreamAuthFailure => "upstream_auth_failure",
            Self::Forbidden => "forbidden",
            Self::NetworkFailure(_) => "network_failure",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UpstreamAuthFailure(_) => Self::UpstreamAuthFailure,
            AuthError::Forbidden => Self::Forbidden,
            AuthError::NetworkFailure(msg) => Self::NetworkFailure(msg),
            AuthError::MissingConfig(_) | AuthError::InvalidResponse(_) | AuthError::Internal(_) => {
                tracing::error!(error = %err, "backend internal error");
                Self::Internal("backend service error".to_string())
            }
        }
    }
}
