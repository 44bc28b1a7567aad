//! Gateway configuration types.
//!
//! This module defines configuration structures for the HTTP gateway and the
//! cookie relay.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Base URL this deployment is reachable at. Used as the fallback when
    /// the inbound request carries no usable Host header.
    #[serde(default = "GatewayConfig::default_public_base_url")]
    pub public_base_url: String,

    /// Name of the session cookie.
    #[serde(default = "GatewayConfig::default_session_cookie_name")]
    pub session_cookie_name: String,

    /// Where the gatekeeper redirects unauthenticated requests.
    #[serde(default = "GatewayConfig::default_sign_in_path")]
    pub sign_in_path: String,

    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Cookie relay tuning.
    #[serde(default)]
    pub relay: RelayConfig,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    fn default_public_base_url() -> String {
        "http://127.0.0.1:8080".to_string()
    }

    fn default_session_cookie_name() -> String {
        "sb-session".to_string()
    }

    fn default_sign_in_path() -> String {
        "/signin".to_string()
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            public_base_url: Self::default_public_base_url(),
            session_cookie_name: Self::default_session_cookie_name(),
            sign_in_path: Self::default_sign_in_path(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            relay: RelayConfig::default(),
        }
    }
}

/// Tuning for the relayed cookie mutation round-trip.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Upper bound on one relay call, in milliseconds.
    #[serde(default = "RelayConfig::default_timeout_ms", alias = "timeoutMs")]
    pub timeout_ms: u64,

    /// Re-attempts after a failed relay call. The default of zero means a
    /// mutation makes exactly one relay call.
    #[serde(default, alias = "maxRetries")]
    pub max_retries: u32,
}

impl RelayConfig {
    const fn default_timeout_ms() -> u64 {
        5000
    }

    /// Get the relay timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
            max_retries: 0,
        }
    }
}
