//! Gateway application state.
//!
//! This module defines the shared state that is available to all request
//! handlers.

use std::sync::Arc;

use sessrelay_auth::AuthService;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// This struct holds references to the services needed by the HTTP handlers.
/// The reqwest client is shared so relay calls reuse its connection pool;
/// everything request-scoped lives in per-request values instead.
pub struct GatewayState<A>
where
    A: AuthService,
{
    /// The backend auth/storage service.
    pub auth: Arc<A>,
    /// HTTP client used for relayed cookie mutations.
    pub http: reqwest::Client,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<A> GatewayState<A>
where
    A: AuthService,
{
    /// Create a new gateway state.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should never happen with
    /// default TLS).
    #[must_use]
    pub fn new(auth: Arc<A>, config: GatewayConfig) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .expect("failed to create HTTP client");

        Self { auth, http, config }
    }
}

impl<A> Clone for GatewayState<A>
where
    A: AuthService,
{
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            http: self.http.clone(),
            config: self.config.clone(),
        }
    }
}
