//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use sessrelay_auth::AuthService;

use crate::gatekeeper::gatekeeper;
use crate::handlers::{cookie, data, health, session};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Auth plumbing (outside the gatekeeper)
/// - `POST /api/auth/cookie` - Write a cookie (relay target)
/// - `DELETE /api/auth/cookie` - Expire a cookie (relay target)
/// - `POST /api/auth/signout` - Sign out and clear the session cookie
///
/// ## Data (behind the gatekeeper)
/// - `GET /api/data/:table` - List the user's rows
/// - `POST /api/data/:table` - Insert a row
/// - `DELETE /api/data/:table/:id` - Delete a row
///
/// The cookie adapter routes sit outside the gatekeeper: they are the relay
/// target, and routing a relay call back through session refresh would add a
/// second round-trip per mutation.
pub fn create_router<A>(state: GatewayState<A>) -> Router
where
    A: AuthService + 'static,
{
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    // Build the router
    let state = Arc::new(state);

    let protected = Router::new()
        .route(
            "/api/data/:table",
            get(data::list_rows::<A>).post(data::insert_row::<A>),
        )
        .route("/api/data/:table/:id", delete(data::delete_row::<A>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            gatekeeper::<A>,
        ));

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Cookie store adapter (internal relay target)
        .route(
            "/api/auth/cookie",
            post(cookie::set_cookie).delete(cookie::clear_cookie),
        )
        // Session lifecycle
        .route("/api/auth/signout", post(session::sign_out::<A>))
        .merge(protected)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // For specific origins, parse them
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
