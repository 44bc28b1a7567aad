//! Sessrelay Gateway - session-cookie relay service
//!
//! This is the main entry point for the gateway service.
//! The gateway fronts a hosted backend-as-a-service: it refreshes sessions
//! before protected routes run, forwards user-scoped row access, and hosts
//! the internal cookie store adapter the server-handler context relays
//! cookie mutations through.
//!
//! # Dev Mode
//!
//! Build with `--features dev-mode` and set `DEV_MODE=true` to use a mock
//! backend that doesn't require network access.
//! Use cookie values in format: `test-session:<user-uuid>`
//!
//! # Configuration
//!
//! `BACKEND_URL` and `BACKEND_ANON_KEY` are required; missing either is a
//! startup-fatal misconfiguration.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sessrelay_auth::{AuthConfig, BackendClient};
#[cfg(feature = "dev-mode")]
use sessrelay_auth::MockAuthService;
use sessrelay_gateway::{create_router, GatewayConfig, GatewayState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sessrelay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sessrelay Gateway");

    // Load configuration from environment
    let config = load_gateway_config();

    tracing::info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        session_cookie_name = %config.session_cookie_name,
        sign_in_path = %config.sign_in_path,
        relay_timeout_ms = config.relay.timeout_ms,
        relay_max_retries = config.relay.max_retries,
        "Gateway configuration loaded"
    );

    #[cfg(feature = "dev-mode")]
    if std::env::var("DEV_MODE").as_deref() == Ok("true") {
        tracing::warn!("DEV MODE ENABLED - using mock backend");
        tracing::warn!("Use cookie values in format: test-session:<user-uuid>");
        let state = GatewayState::new(Arc::new(MockAuthService::default()), config);
        return serve(state).await;
    }

    // Backend configuration is startup-fatal when absent
    let auth_config = AuthConfig::from_env()?;
    tracing::info!(backend_url = %auth_config.base_url, "Backend client initialized");

    let state = GatewayState::new(Arc::new(BackendClient::new(auth_config)), config);
    serve(state).await
}

async fn serve<A>(state: GatewayState<A>) -> Result<(), Box<dyn std::error::Error>>
where
    A: sessrelay_auth::AuthService + 'static,
{
    let listen_addr = state.config.listen_addr.clone();
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the gateway configuration from environment variables, keeping
/// the defaults for anything unset.
fn load_gateway_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();

    if let Ok(value) = std::env::var("LISTEN_ADDR") {
        config.listen_addr = value;
    }
    if let Ok(value) = std::env::var("PUBLIC_BASE_URL") {
        config.public_base_url = value;
    }
    if let Ok(value) = std::env::var("SESSION_COOKIE_NAME") {
        config.session_cookie_name = value;
    }
    if let Ok(value) = std::env::var("SIGN_IN_PATH") {
        config.sign_in_path = value;
    }
    if let Some(value) = env_parsed("RELAY_TIMEOUT_MS") {
        config.relay.timeout_ms = value;
    }
    if let Some(value) = env_parsed("RELAY_MAX_RETRIES") {
        config.relay.max_retries = value;
    }

    config
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|raw| raw.parse().ok())
}
