//! Wire format for the cookie store adapter.
//!
//! Both sides of the relay speak this format: the server-handler session
//! client serializes these payloads, and the adapter route deserializes them
//! and materializes a `Set-Cookie` header.

use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Path of the cookie store adapter on this deployment.
pub const COOKIE_ADAPTER_PATH: &str = "/api/auth/cookie";

/// Cookie attributes carried alongside a relayed mutation.
///
/// Field names are camelCase on the wire. Attributes left out are left off
/// the resulting `Set-Cookie` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieOptions {
    /// Max-Age in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
    /// Expires as a unix timestamp in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    /// Path attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Domain attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Secure attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    /// HttpOnly attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    /// SameSite attribute: `lax`, `strict`, or `none` (case-insensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

/// Body of `POST /api/auth/cookie`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCookieRequest {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Cookie attributes.
    #[serde(default)]
    pub options: CookieOptions,
}

/// Body of `DELETE /api/auth/cookie`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearCookieRequest {
    /// Cookie name.
    pub name: String,
    /// Cookie attributes. Path and domain must match the original cookie for
    /// the browser to clear it.
    #[serde(default)]
    pub options: CookieOptions,
}

/// Acknowledgment returned by both adapter operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    /// Always `true` on the success path.
    pub success: bool,
}

/// Reasons a mutation cannot be materialized as a `Set-Cookie` header.
#[derive(Debug, Error)]
pub enum CookieBuildError {
    /// The cookie name is empty.
    #[error("cookie name must not be empty")]
    EmptyName,

    /// The cookie name contains characters not allowed in a header.
    #[error("invalid cookie name")]
    InvalidName,

    /// The cookie value contains characters not allowed in a header.
    #[error("invalid cookie value")]
    InvalidValue,
}

/// Build a `Set-Cookie`-ready cookie from a relayed mutation.
///
/// # Errors
///
/// Returns a [`CookieBuildError`] when the name is empty or the name/value
/// cannot appear in a header.
pub fn build_cookie(
    name: &str,
    value: &str,
    options: &CookieOptions,
) -> Result<Cookie<'static>, CookieBuildError> {
    if name.is_empty() {
        return Err(CookieBuildError::EmptyName);
    }
    if !name.chars().all(is_name_char) {
        return Err(CookieBuildError::InvalidName);
    }
    if !value.chars().all(is_value_char) {
        return Err(CookieBuildError::InvalidValue);
    }

    let mut cookie = Cookie::new(name.to_owned(), value.to_owned());

    if let Some(secs) = options.max_age {
        cookie.set_max_age(Duration::seconds(secs));
    }
    if let Some(timestamp) = options.expires {
        if let Ok(expires) = OffsetDateTime::from_unix_timestamp(timestamp) {
            cookie.set_expires(expires);
        }
    }
    if let Some(path) = &options.path {
        cookie.set_path(path.clone());
    }
    if let Some(domain) = &options.domain {
        cookie.set_domain(domain.clone());
    }
    if let Some(secure) = options.secure {
        cookie.set_secure(secure);
    }
    if let Some(http_only) = options.http_only {
        cookie.set_http_only(http_only);
    }
    if let Some(same_site) = &options.same_site {
        cookie.set_same_site(parse_same_site(same_site));
    }

    Ok(cookie)
}

/// Build the cookie that clears `name`: empty value, Max-Age zero, all other
/// supplied attributes preserved so the browser matches the original cookie.
///
/// # Errors
///
/// Returns a [`CookieBuildError`] when the name is empty or invalid.
pub fn build_removal_cookie(
    name: &str,
    options: &CookieOptions,
) -> Result<Cookie<'static>, CookieBuildError> {
    let options = CookieOptions {
        max_age: Some(0),
        expires: None,
        ..options.clone()
    };
    build_cookie(name, "", &options)
}

fn parse_same_site(raw: &str) -> SameSite {
    match raw.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

// RFC 6265 token characters for the name.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

// RFC 6265 cookie-octet plus '=', which tokens in the wild use freely.
fn is_value_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '\\')
}
