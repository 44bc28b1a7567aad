//! Backend session and storage client for sessrelay.
//!
//! This crate wraps the hosted backend-as-a-service that owns authentication
//! and row storage. It provides:
//!
//! - Session validation and refresh against the backend auth API
//! - Sign-out (upstream session revocation)
//! - Row-level table access scoped by the authenticated user
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Gateway        │────▶│   AuthService    │
//! │   (HTTP)         │     │   (trait)        │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                          ┌────────▼─────────┐
//!                          │  BackendClient   │
//!                          │  (impl)          │
//!                          └────────┬─────────┘
//!                                   │ HTTPS
//!                          ┌────────▼─────────┐
//!                          │  Hosted backend  │
//!                          │  auth + storage  │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sessrelay_auth::{AuthConfig, AuthService, BackendClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::from_env()?;
//! let client = BackendClient::new(config);
//!
//! // In a request handler:
//! if let Some(session) = client.refresh_session("eyJhbGciOiJIUzI1...").await? {
//!     println!("User ID: {}", session.user_id);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod service;

pub use client::{AuthSession, BackendClient};
pub use error::{AuthError, Result};
pub use service::AuthService;

#[cfg(any(test, feature = "test-utils"))]
pub use service::MockAuthService;

/// Environment variable naming the backend's base URL.
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";

/// Environment variable naming the backend's anonymous API key.
pub const ENV_BACKEND_ANON_KEY: &str = "BACKEND_ANON_KEY";

/// Configuration for the hosted backend.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL for the backend (e.g., `https://project.example.co`).
    pub base_url: String,
    /// Anonymous API key sent with every backend request.
    pub anon_key: String,
}

impl AuthConfig {
    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingConfig`] if `BACKEND_URL` or
    /// `BACKEND_ANON_KEY` is unset or empty. Any component that constructs a
    /// backend client treats this as a startup-fatal misconfiguration.
    pub fn from_env() -> Result<Self> {
        let base_url = read_env(ENV_BACKEND_URL)?;
        let anon_key = read_env(ENV_BACKEND_ANON_KEY)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    /// Get the session-introspection endpoint URL.
    #[must_use]
    pub fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }

    /// Get the token refresh endpoint URL.
    #[must_use]
    pub fn refresh_url(&self) -> String {
        format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url)
    }

    /// Get the sign-out endpoint URL.
    #[must_use]
    pub fn logout_url(&self) -> String {
        format!("{}/auth/v1/logout", self.base_url)
    }

    /// Get the row-access endpoint URL for a table.
    #[must_use]
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }
}

fn read_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AuthError::MissingConfig(name)),
    }
}
