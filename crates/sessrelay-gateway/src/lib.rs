//! HTTP gateway with a session-cookie relay for sessrelay.
//!
//! This crate fronts a hosted backend-as-a-service that owns authentication
//! and row storage. It handles:
//!
//! - The cookie store adapter (`/api/auth/cookie`), an internal surface that
//!   writes session cookies onto its own response
//! - Request-scoped session clients in two flavors, one per execution
//!   context: handlers relay cookie writes over HTTP, middleware writes the
//!   response draft directly
//! - The gatekeeper middleware that refreshes the session before protected
//!   routes run
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Browser                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    sessrelay-gateway                        │
//! │  ┌─────────────┐ ┌──────────────┐ ┌─────────────────────┐   │
//! │  │ Gatekeeper  │ │   Router     │ │  Cookie Store       │   │
//! │  │ (refresh)   │ │  + Handlers  │ │  Adapter            │   │
//! │  └─────────────┘ └──────┬───────┘ └─────────▲───────────┘   │
//! │                         │    relayed writes │               │
//! │                         └───────────────────┘               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       ┌──────────┐
//!                       │ Hosted   │
//!                       │ backend  │
//!                       └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sessrelay_auth::{AuthConfig, BackendClient};
//! use sessrelay_gateway::{create_router, GatewayConfig, GatewayState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = Arc::new(BackendClient::new(AuthConfig::from_env()?));
//! let state = GatewayState::new(auth, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod context;
pub mod draft;
pub mod error;
pub mod gatekeeper;
pub mod handlers;
pub mod relay;
pub mod routes;
pub mod state;

pub use config::{GatewayConfig, RelayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;

// Re-export key types for convenience
pub use client::SessionClient;
pub use gatekeeper::CurrentSession;
pub use relay::CookieOptions;
