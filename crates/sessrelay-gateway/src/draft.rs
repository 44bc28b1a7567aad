//! The outgoing response draft.
//!
//! In the middleware execution context the caller owns the final response for
//! the whole request lifecycle, so cookie mutations land here directly. The
//! draft is finalized exactly once, when its pending cookies are applied to
//! the downstream response.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use axum_extra::extract::cookie::Cookie;

/// The response under construction, owning zero or more pending cookie
/// mutations.
///
/// Every mutation replaces the draft with a fresh one carrying the same
/// request headers, so response chaining is not broken by successive cookie
/// writes within one request.
#[derive(Debug)]
pub struct ResponseDraft {
    request_headers: HeaderMap,
    cookies: Vec<Cookie<'static>>,
}

impl ResponseDraft {
    /// Start a draft for a request with the given headers.
    #[must_use]
    pub const fn new(request_headers: HeaderMap) -> Self {
        Self {
            request_headers,
            cookies: Vec::new(),
        }
    }

    /// The request headers the draft carries across rebuilds.
    #[must_use]
    pub const fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    /// Cookies staged on the draft, most recent write per name winning.
    #[must_use]
    pub fn pending_cookies(&self) -> &[Cookie<'static>] {
        &self.cookies
    }

    /// Stage a cookie mutation, swapping in a fresh draft that carries the
    /// same request headers.
    pub fn stage(&mut self, cookie: Cookie<'static>) {
        let request_headers = std::mem::take(&mut self.request_headers);
        let mut cookies = std::mem::take(&mut self.cookies);
        cookies.retain(|staged| staged.name() != cookie.name());
        cookies.push(cookie);

        *self = Self {
            request_headers,
            cookies,
        };
    }

    /// Finalize the draft: append its pending cookies to `response` as
    /// `Set-Cookie` headers. Consumes the draft; a draft is applied at most
    /// once per request.
    #[must_use]
    pub fn apply_to(self, mut response: Response) -> Response {
        for cookie in &self.cookies {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(err) => {
                    tracing::warn!(name = cookie.name(), error = %err, "dropping unencodable cookie");
                }
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    fn request_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-1"));
        headers.insert("host", HeaderValue::from_static("app.example.com"));
        headers
    }

    #[test]
    fn stage_preserves_request_headers() {
        let mut draft = ResponseDraft::new(request_headers());

        draft.stage(Cookie::new("sb-session", "a"));
        draft.stage(Cookie::new("sb-session", "b"));
        draft.stage(Cookie::new("other", "x"));

        assert_eq!(
            draft.request_headers().get("x-request-id"),
            Some(&HeaderValue::from_static("req-1"))
        );
        assert_eq!(
            draft.request_headers().get("host"),
            Some(&HeaderValue::from_static("app.example.com"))
        );
    }

    #[test]
    fn last_write_per_name_wins() {
        let mut draft = ResponseDraft::new(HeaderMap::new());

        draft.stage(Cookie::new("sb-session", "stale"));
        draft.stage(Cookie::new("sb-session", "fresh"));

        assert_eq!(draft.pending_cookies().len(), 1);
        assert_eq!(draft.pending_cookies()[0].value(), "fresh");
    }

    #[test]
    fn apply_appends_set_cookie_headers() {
        let mut draft = ResponseDraft::new(HeaderMap::new());
        draft.stage(Cookie::new("sb-session", "abc123"));
        draft.stage(Cookie::new("theme", "dark"));

        let response = draft.apply_to(Response::new(Body::empty()));
        let cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("sb-session=abc123")));
        assert!(cookies.iter().any(|c| c.starts_with("theme=dark")));
    }

    #[test]
    fn empty_draft_applies_cleanly() {
        let draft = ResponseDraft::new(HeaderMap::new());
        let response = draft.apply_to(Response::new(Body::empty()));
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
