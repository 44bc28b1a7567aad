//! The cookie store adapter.
//!
//! An internal-only surface that lets the server-handler execution context
//! mutate cookies: the handler there does not own its final response, so it
//! relays the mutation here, and this route writes the cookie onto the
//! response it owns.
//!
//! Both operations are idempotent under retry: repeated SET with the same
//! value, or repeated DELETE, produce the same end state. This handler never
//! issues relay calls of its own.

use axum::body::Bytes;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::relay::{
    build_cookie, build_removal_cookie, AckResponse, ClearCookieRequest, SetCookieRequest,
};

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/cookie` - write a cookie to this response.
///
/// # Errors
///
/// Any failure, including a malformed body, surfaces as status 500 with the
/// body `{"error":"Failed to set cookie"}`; the relay contract has no 4xx
/// surface.
pub async fn set_cookie(body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let request: SetCookieRequest = serde_json::from_slice(&body).map_err(|err| {
        tracing::warn!(error = %err, "unparseable cookie set body");
        ApiError::InvalidRequest("Failed to set cookie".to_string())
    })?;

    if request.name.is_empty() {
        return Err(ApiError::InvalidRequest("Failed to set cookie".to_string()));
    }

    let cookie = build_cookie(&request.name, &request.value, &request.options).map_err(|err| {
        tracing::warn!(name = %request.name, error = %err, "cookie store rejected write");
        ApiError::StoreUnavailable("Failed to set cookie".to_string())
    })?;

    let jar = CookieJar::new().add(cookie);
    Ok((jar, Json(AckResponse { success: true })))
}

/// `DELETE /api/auth/cookie` - expire a cookie on this response.
///
/// Writes the named cookie with an empty value and Max-Age zero, preserving
/// the supplied path/domain so the browser matches and clears the original.
///
/// # Errors
///
/// Any failure surfaces as status 500 with the body
/// `{"error":"Failed to delete cookie"}`.
pub async fn clear_cookie(body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let request: ClearCookieRequest = serde_json::from_slice(&body).map_err(|err| {
        tracing::warn!(error = %err, "unparseable cookie delete body");
        ApiError::InvalidRequest("Failed to delete cookie".to_string())
    })?;

    if request.name.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Failed to delete cookie".to_string(),
        ));
    }

    let cookie = build_removal_cookie(&request.name, &request.options).map_err(|err| {
        tracing::warn!(name = %request.name, error = %err, "cookie store rejected removal");
        ApiError::StoreUnavailable("Failed to delete cookie".to_string())
    })?;

    let jar = CookieJar::new().add(cookie);
    Ok((jar, Json(AckResponse { success: true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;
    use axum::http::StatusCode;

    fn set_cookie_header(response: &axum::response::Response) -> String {
        response
            .headers()
            .get(SET_COOKIE)
            .expect("Set-Cookie present")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn set_writes_cookie_and_acks() {
        let body = Bytes::from(
            r#"{"name":"sb-session","value":"abc123","options":{"maxAge":3600}}"#,
        );
        let response = set_cookie(body).await.unwrap().into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let header = set_cookie_header(&response);
        assert!(header.starts_with("sb-session=abc123"));
        assert!(header.contains("Max-Age=3600"));
    }

    #[tokio::test]
    async fn delete_expires_cookie_preserving_path() {
        let body = Bytes::from(r#"{"name":"sb-session","options":{"path":"/"}}"#);
        let response = clear_cookie(body).await.unwrap().into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let header = set_cookie_header(&response);
        assert!(header.starts_with("sb-session="));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Path=/"));
    }

    #[tokio::test]
    async fn malformed_set_body_is_invalid_request() {
        let err = set_cookie(Bytes::from("{not json"))
            .await
            .map(IntoResponse::into_response)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert_eq!(err.to_string(), "Failed to set cookie");
    }

    #[tokio::test]
    async fn malformed_delete_body_is_invalid_request() {
        let err = clear_cookie(Bytes::from(r#"{"options":{}}"#))
            .await
            .map(IntoResponse::into_response)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert_eq!(err.to_string(), "Failed to delete cookie");
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let body = Bytes::from(r#"{"name":"","value":"v","options":{}}"#);
        let err = set_cookie(body)
            .await
            .map(IntoResponse::into_response)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn header_breaking_value_is_store_unavailable() {
        let body = Bytes::from(r#"{"name":"sb-session","value":"a;b","options":{}}"#);
        let err = set_cookie(body)
            .await
            .map(IntoResponse::into_response)
            .unwrap_err();
        assert!(matches!(err, ApiError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn set_is_idempotent() {
        let body = r#"{"name":"sb-session","value":"abc123","options":{"maxAge":3600}}"#;
        let first = set_cookie(Bytes::from(body)).await.unwrap().into_response();
        let second = set_cookie(Bytes::from(body)).await.unwrap().into_response();
        assert_eq!(set_cookie_header(&first), set_cookie_header(&second));
    }
}
