//! Per-request context snapshot.
//!
//! A [`RequestContext`] captures the inbound request's headers and cookies
//! once, immutably, for the duration of one request. Handlers and session
//! clients read from the snapshot instead of reaching for ambient
//! framework state.

use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;

/// Immutable snapshot of an inbound request's headers and cookie jar.
///
/// Owned exclusively by the handler processing the request; never shared
/// across requests.
#[derive(Debug)]
pub struct RequestContext {
    headers: HeaderMap,
    jar: CookieJar,
}

impl RequestContext {
    /// Snapshot a request's headers.
    #[must_use]
    pub fn from_headers(headers: HeaderMap) -> Self {
        let jar = CookieJar::from_headers(&headers);
        Self { headers, jar }
    }

    /// Read a cookie value from the inbound snapshot. No network call.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar.get(name).map(|c| c.value().to_string())
    }

    /// The snapshotted request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Compute this deployment's own base URL from the inbound host and
    /// protocol, falling back to `fallback` when the request carries no
    /// usable Host header.
    #[must_use]
    pub fn base_url(&self, fallback: &str) -> String {
        let Some(host) = self
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|h| !h.is_empty())
        else {
            return fallback.trim_end_matches('/').to_string();
        };

        let proto = self
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("http");

        format!("{proto}://{host}")
    }
}
