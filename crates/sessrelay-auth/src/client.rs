//! HTTP client for the hosted backend's auth and storage APIs.
//!
//! This module provides the concrete client used in production. The backend's
//! own auth and storage semantics are opaque; the client only shapes requests
//! and decodes responses.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::AuthConfig;

/// A validated session returned by the backend.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The current access token. After a refresh this is the value the
    /// session cookie should be rewritten with.
    pub access_token: String,
    /// Refresh token, when the backend rotated it.
    pub refresh_token: Option<String>,
    /// When the access token expires, when the backend reported it.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request payload for a token refresh.
#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Raw response from the backend's user-introspection endpoint.
#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
}

/// Raw response from the backend's refresh endpoint.
#[derive(Debug, Deserialize)]
struct RawRefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    user: RawUser,
}

/// Client for the hosted backend's auth and storage APIs.
pub struct BackendClient {
    config: AuthConfig,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a new backend client with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should never happen with
    /// default TLS).
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    /// Look up the session behind an access token without refreshing it.
    ///
    /// Returns `None` when the backend rejects the token. Rejection is not an
    /// error from the caller's point of view; it means "no session".
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or replies with a
    /// malformed or server-error response.
    pub async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>> {
        let response = self
            .client
            .get(self.config.user_url())
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::NetworkFailure(format!("user lookup failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::UpstreamAuthFailure(format!("HTTP {status}")));
        }

        let raw: RawUser = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        Ok(Some(AuthSession {
            user_id: parse_user_id(&raw.id)?,
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: None,
        }))
    }

    /// Exchange a refresh token for a fresh session.
    ///
    /// Returns `None` when the token is invalid or the session has been
    /// revoked upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or replies with a
    /// malformed or server-error response.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Option<AuthSession>> {
        let response = self
            .client
            .post(self.config.refresh_url())
            .header("apikey", &self.config.anon_key)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| AuthError::NetworkFailure(format!("refresh failed: {e}")))?;

        let status = response.status();
        if status.is_client_error() {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::UpstreamAuthFailure(format!("HTTP {status}")));
        }

        let raw: RawRefreshResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        let expires_at = raw.expires_in.map(|secs| {
            let secs = i64::try_from(secs).unwrap_or(i64::MAX);
            Utc::now() + chrono::Duration::seconds(secs)
        });

        Ok(Some(AuthSession {
            user_id: parse_user_id(&raw.user.id)?,
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
            expires_at,
        }))
    }

    /// Revoke the session behind an access token.
    ///
    /// A token the backend no longer recognizes is treated as already signed
    /// out.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or replies with a
    /// server-error response.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.config.logout_url())
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::NetworkFailure(format!("sign-out failed: {e}")))?;

        let status = response.status();
        if status.is_success() || status.as_u16() == 401 {
            Ok(())
        } else {
            Err(AuthError::UpstreamAuthFailure(format!("HTTP {status}")))
        }
    }

    /// Select all rows in `table` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, denies access, or
    /// replies with a malformed response.
    pub async fn select_rows(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Vec<serde_json::Value>> {
        let response = self
            .client
            .get(self.config.table_url(table))
            .query(&[("user_id", format!("eq.{user_id}"))])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::NetworkFailure(format!("select failed: {e}")))?;

        let response = check_table_status(response)?;
        response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }

    /// Insert one row into `table`, stamped with `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or denies access.
    pub async fn insert_row(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
        mut row: serde_json::Value,
    ) -> Result<()> {
        if let Some(object) = row.as_object_mut() {
            object.insert(
                "user_id".to_string(),
                serde_json::Value::String(user_id.to_string()),
            );
        }

        let response = self
            .client
            .post(self.config.table_url(table))
            .header("apikey", &self.config.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(access_token)
            .json(&row)
            .send()
            .await
            .map_err(|e| AuthError::NetworkFailure(format!("insert failed: {e}")))?;

        check_table_status(response).map(|_| ())
    }

    /// Delete the row with primary key `id` from `table`, scoped to
    /// `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or denies access.
    pub async fn delete_rows(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
        id: &str,
    ) -> Result<()> {
        let response = self
            .client
            .delete(self.config.table_url(table))
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("id", format!("eq.{id}")),
            ])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::NetworkFailure(format!("delete failed: {e}")))?;

        check_table_status(response).map(|_| ())
    }
}

/// Map a row-access response status to our error taxonomy.
fn check_table_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    match status.as_u16() {
        200..=299 => Ok(response),
        401 => Err(AuthError::UpstreamAuthFailure("HTTP 401".to_string())),
        403 => Err(AuthError::Forbidden),
        _ => Err(AuthError::Internal(format!("HTTP {status}"))),
    }
}

fn parse_user_id(raw: &str) -> Result<Uuid> {
    Uuid::from_str(raw)
        .map_err(|_| AuthError::InvalidResponse(format!("invalid user id: {raw}")))
}
