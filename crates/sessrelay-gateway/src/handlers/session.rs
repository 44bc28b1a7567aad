//! Session lifecycle endpoints.
//!
//! Sign-out runs in the server-handler execution context: it does not own
//! the final response, so the cookie removal goes through the relay.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use sessrelay_auth::AuthService;

use crate::client::SessionClient;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::relay::{AckResponse, CookieOptions};
use crate::state::GatewayState;

/// `POST /api/auth/signout` - revoke the session upstream and expire the
/// session cookie.
///
/// Revocation is best-effort: a backend that no longer recognizes the token
/// still gets the cookie cleared. The cookie removal itself is relayed, so a
/// lost relay call only delays the clear until the next sign-out attempt.
///
/// # Errors
///
/// Currently infallible; typed for uniformity with the other handlers.
pub async fn sign_out<A>(
    State(state): State<Arc<GatewayState<A>>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
    A: AuthService + 'static,
{
    let context = RequestContext::from_headers(headers);
    let mut client = SessionClient::for_handler(
        context,
        state.http.clone(),
        state.config.relay.clone(),
        &state.config.public_base_url,
    );

    if let Some(token) = client.get(&state.config.session_cookie_name) {
        if let Err(err) = state.auth.sign_out(&token).await {
            tracing::warn!(error = %err, "upstream sign-out failed");
        }
    }

    let options = CookieOptions {
        path: Some("/".to_string()),
        ..CookieOptions::default()
    };
    client
        .remove(&state.config.session_cookie_name, &options)
        .await;

    Ok(Json(AckResponse { success: true }))
}
