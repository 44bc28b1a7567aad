//! Liveness endpoint.
//!
//! Deployment probes hit this before routing traffic at the gateway. It
//! reports nothing about the hosted backend: the gateway is up as soon as it
//! can serve the cookie adapter and gatekeeper, and backend reachability is
//! judged per request.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Gateway status; always `ok` when the process answers.
    pub status: &'static str,
    /// Serving crate name.
    pub service: &'static str,
    /// Serving crate version.
    pub version: &'static str,
}

/// `GET /health` - public liveness probe, no session required.
pub async fn health() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response))
}
