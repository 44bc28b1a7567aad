//! The request gatekeeper.
//!
//! A per-request hook that refreshes and validates the session before a
//! protected route executes. It runs in the middleware execution context, so
//! it owns the outgoing response draft and writes cookies to it directly.
//!
//! A failed refresh is "no session", never an error: the user is redirected
//! to the sign-in location. No retries.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use uuid::Uuid;

use sessrelay_auth::AuthService;

use crate::client::SessionClient;
use crate::error::ApiError;
use crate::relay::CookieOptions;
use crate::state::GatewayState;

/// The validated session for the current request, stashed in request
/// extensions by the gatekeeper.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The access token downstream handlers pass to the backend.
    pub access_token: String,
}

impl<S> axum::extract::FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<CurrentSession>()
                .cloned()
                .ok_or(ApiError::UpstreamAuthFailure)
        })
    }
}

/// Refresh the session before the protected route runs.
///
/// Builds the middleware-variant session client, refreshes the session with
/// the backend, rewrites the session cookie on the owned draft, and lets the
/// mutated draft flow into the downstream response. Requests without a valid
/// session are redirected to the sign-in location.
pub async fn gatekeeper<A>(
    State(state): State<Arc<GatewayState<A>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    A: AuthService + 'static,
{
    let mut client = SessionClient::for_middleware(request.headers().clone());
    let cookie_name = state.config.session_cookie_name.clone();

    let Some(token) = client.get(&cookie_name) else {
        return Redirect::to(&state.config.sign_in_path).into_response();
    };

    let session = match state.auth.refresh_session(&token).await {
        Ok(session) => session,
        Err(err) => {
            // Treated as "no session" rather than an error.
            tracing::warn!(error = %err, "session refresh failed");
            None
        }
    };

    let Some(session) = session else {
        return Redirect::to(&state.config.sign_in_path).into_response();
    };

    // Rewrite value and expiry on every validated request. The cookie must
    // carry what the next request's refresh consumes: the rotated refresh
    // token when the backend issued one, otherwise the inbound value. The
    // access token only travels downstream within this request.
    let next_value = session.refresh_token.as_deref().unwrap_or(&token);
    let options = session_cookie_options(&state.config.public_base_url, session.expires_at);
    client.set(&cookie_name, next_value, &options).await;

    request.extensions_mut().insert(CurrentSession {
        user_id: session.user_id,
        access_token: session.access_token,
    });

    let response = next.run(request).await;

    match client.into_draft() {
        Some(draft) => draft.apply_to(response),
        None => response,
    }
}

/// Attributes for the rewritten session cookie.
fn session_cookie_options(
    public_base_url: &str,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
) -> CookieOptions {
    let max_age = expires_at
        .map(|at| (at - chrono::Utc::now()).num_seconds().max(0))
        .unwrap_or(3600);

    CookieOptions {
        max_age: Some(max_age),
        path: Some("/".to_string()),
        http_only: Some(true),
        same_site: Some("lax".to_string()),
        secure: Some(public_base_url.starts_with("https://")),
        ..CookieOptions::default()
    }
}
