//! Request-scoped session clients.
//!
//! One client is constructed per inbound request and discarded when the
//! response is sent. Reads always come from the request's own snapshot; how a
//! write lands depends on which execution context built the client:
//!
//! - **Server handler** (`for_handler`): the handler does not own the final
//!   response, so mutations are relayed over same-origin HTTP to the cookie
//!   store adapter, which owns its own response.
//! - **Middleware** (`for_middleware`): the caller owns the response draft
//!   for the whole request, so mutations land on the draft directly with no
//!   network call.
//!
//! The two strategies are mutually exclusive per execution context and are
//! never mixed within a single request.

use axum::http::HeaderMap;

use crate::config::RelayConfig;
use crate::context::RequestContext;
use crate::draft::ResponseDraft;
use crate::relay::{
    build_cookie, build_removal_cookie, ClearCookieRequest, CookieOptions, SetCookieRequest,
    COOKIE_ADAPTER_PATH,
};

/// How a cookie mutation reaches the outgoing response.
enum CookieWriter {
    /// Same-origin HTTP round-trip to the cookie store adapter.
    Relay {
        http: reqwest::Client,
        endpoint: String,
        relay: RelayConfig,
    },
    /// In-place mutation of the owned response draft.
    Direct { draft: ResponseDraft },
}

/// A request-scoped session cookie client.
///
/// Exposes get/set/remove over the session cookie. `get` never touches the
/// network; `set`/`remove` follow the construction strategy.
pub struct SessionClient {
    context: RequestContext,
    writer: CookieWriter,
}

impl SessionClient {
    /// Build the server-handler variant.
    ///
    /// Mutations relay to `<own base url>/api/auth/cookie`, where the base
    /// URL comes from the inbound host and protocol with `fallback_base_url`
    /// as the local default.
    #[must_use]
    pub fn for_handler(
        context: RequestContext,
        http: reqwest::Client,
        relay: RelayConfig,
        fallback_base_url: &str,
    ) -> Self {
        let endpoint = format!("{}{COOKIE_ADAPTER_PATH}", context.base_url(fallback_base_url));
        Self {
            context,
            writer: CookieWriter::Relay {
                http,
                endpoint,
                relay,
            },
        }
    }

    /// Build the middleware variant, which owns the outgoing response draft.
    #[must_use]
    pub fn for_middleware(request_headers: HeaderMap) -> Self {
        let context = RequestContext::from_headers(request_headers.clone());
        Self {
            context,
            writer: CookieWriter::Direct {
                draft: ResponseDraft::new(request_headers),
            },
        }
    }

    /// Read a cookie from the inbound request snapshot. No network call.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.context.cookie(name)
    }

    /// The adapter endpoint mutations relay to, if this is the handler
    /// variant.
    #[must_use]
    pub fn relay_endpoint(&self) -> Option<&str> {
        match &self.writer {
            CookieWriter::Relay { endpoint, .. } => Some(endpoint),
            CookieWriter::Direct { .. } => None,
        }
    }

    /// Write the cookie.
    ///
    /// Relay failures are logged and swallowed: a lost cookie write only
    /// degrades session freshness, never the correctness of the current
    /// response.
    pub async fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        match &mut self.writer {
            CookieWriter::Relay {
                http,
                endpoint,
                relay,
            } => {
                let body = SetCookieRequest {
                    name: name.to_string(),
                    value: value.to_string(),
                    options: options.clone(),
                };
                relay_call(http, reqwest::Method::POST, endpoint, &body, relay).await;
            }
            CookieWriter::Direct { draft } => match build_cookie(name, value, options) {
                Ok(cookie) => draft.stage(cookie),
                Err(err) => {
                    tracing::warn!(name, error = %err, "cookie store unavailable for write");
                }
            },
        }
    }

    /// Expire the cookie: empty value, Max-Age zero, supplied path/domain
    /// preserved. Same best-effort contract as [`Self::set`].
    pub async fn remove(&mut self, name: &str, options: &CookieOptions) {
        match &mut self.writer {
            CookieWriter::Relay {
                http,
                endpoint,
                relay,
            } => {
                let body = ClearCookieRequest {
                    name: name.to_string(),
                    options: options.clone(),
                };
                relay_call(http, reqwest::Method::DELETE, endpoint, &body, relay).await;
            }
            CookieWriter::Direct { draft } => match build_removal_cookie(name, options) {
                Ok(cookie) => draft.stage(cookie),
                Err(err) => {
                    tracing::warn!(name, error = %err, "cookie store unavailable for removal");
                }
            },
        }
    }

    /// Release the owned response draft. `None` for the handler variant,
    /// whose mutations already went through the relay.
    #[must_use]
    pub fn into_draft(self) -> Option<ResponseDraft> {
        match self.writer {
            CookieWriter::Relay { .. } => None,
            CookieWriter::Direct { draft } => Some(draft),
        }
    }
}

/// One best-effort relay round-trip, re-attempted up to `relay.max_retries`
/// times. Each attempt is bounded by the configured timeout so an aborted
/// caller never leaves a worker waiting.
async fn relay_call<B: serde::Serialize>(
    http: &reqwest::Client,
    method: reqwest::Method,
    endpoint: &str,
    body: &B,
    relay: &RelayConfig,
) {
    let attempts = relay.max_retries.saturating_add(1);

    for attempt in 1..=attempts {
        let result = http
            .request(method.clone(), endpoint)
            .timeout(relay.timeout())
            .json(body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => return,
            Ok(response) => {
                tracing::warn!(
                    endpoint,
                    status = %response.status(),
                    attempt,
                    "cookie relay call rejected"
                );
            }
            Err(err) => {
                tracing::warn!(endpoint, error = %err, attempt, "cookie relay call failed");
            }
        }
    }
}
