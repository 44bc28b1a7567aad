//! Backend client error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while talking to the hosted backend.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required environment variable is unset or empty.
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// The auth service call failed or returned no usable session.
    #[error("upstream auth failure: {0}")]
    UpstreamAuthFailure(String),

    /// The HTTP call to the backend could not be completed.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The backend returned a response that could not be decoded.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// The backend rejected the request for lack of permission.
    #[error("forbidden")]
    Forbidden,

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns `true` if this error should be treated as "no session" rather
    /// than surfaced to the end user.
    #[must_use]
    pub const fn means_no_session(&self) -> bool {
        matches!(
            self,
            Self::UpstreamAuthFailure(_) | Self::NetworkFailure(_)
        )
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::UpstreamAuthFailure(_) => 401,
            Self::Forbidden => 403,
            Self::MissingConfig(_)
            | Self::NetworkFailure(_)
            | Self::InvalidResponse(_)
            | Self::Internal(_) => 500,
        }
    }
}
