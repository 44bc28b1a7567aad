//! The `AuthService` seam between the gateway and the hosted backend.
//!
//! The gateway is generic over this trait so request handling can be tested
//! without network access to the backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::client::{AuthSession, BackendClient};
use crate::error::Result;

/// Operations the gateway needs from the hosted backend.
///
/// Covers the collaborator surface: session introspection and refresh,
/// sign-out, and user-scoped row access. The backend's own semantics are
/// opaque; implementations only move data.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Look up the session behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport or server failures; a rejected
    /// token is `Ok(None)`.
    async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>>;

    /// Refresh the session behind a token, rotating credentials when the
    /// backend does.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport or server failures; a rejected
    /// token is `Ok(None)`.
    async fn refresh_session(&self, token: &str) -> Result<Option<AuthSession>>;

    /// Revoke the session behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or server failures.
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    /// Select all rows in `table` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error for transport, permission, or server failures.
    async fn select_rows(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Vec<serde_json::Value>>;

    /// Insert one row into `table`, stamped with `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error for transport, permission, or server failures.
    async fn insert_row(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
        row: serde_json::Value,
    ) -> Result<()>;

    /// Delete the row with primary key `id` from `table`, scoped to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error for transport, permission, or server failures.
    async fn delete_rows(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
        id: &str,
    ) -> Result<()>;
}

#[async_trait]
impl AuthService for BackendClient {
    async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>> {
        Self::get_session(self, access_token).await
    }

    async fn refresh_session(&self, token: &str) -> Result<Option<AuthSession>> {
        Self::refresh_session(self, token).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        Self::sign_out(self, access_token).await
    }

    async fn select_rows(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Vec<serde_json::Value>> {
        Self::select_rows(self, table, access_token, user_id).await
    }

    async fn insert_row(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
        row: serde_json::Value,
    ) -> Result<()> {
        Self::insert_row(self, table, access_token, user_id, row).await
    }

    async fn delete_rows(
        &self,
        table: &str,
        access_token: &str,
        user_id: Uuid,
        id: &str,
    ) -> Result<()> {
        Self::delete_rows(self, table, access_token, user_id, id).await
    }
}

/// A mock backend for testing.
///
/// Accepts any token in the format `test-session:<user_uuid>` and treats
/// everything else as "no session". Rows live in memory, keyed by table name.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockAuthService {
    /// When set, `refresh_session` also rotates the refresh token by
    /// appending `:r` so callers can observe the cookie rewrite.
    pub rotate_on_refresh: bool,
    rows: std::sync::Mutex<std::collections::HashMap<String, Vec<serde_json::Value>>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockAuthService {
    fn default() -> Self {
        Self {
            rotate_on_refresh: false,
            rows: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl MockAuthService {
    /// Create a mock that rotates tokens on refresh.
    #[must_use]
    pub fn rotating() -> Self {
        Self {
            rotate_on_refresh: true,
            ..Self::default()
        }
    }

    fn parse(token: &str) -> Option<Uuid> {
        let raw = token
            .strip_prefix("test-session:")?
            .split(':')
            .next()?;
        Uuid::parse_str(raw).ok()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl AuthService for MockAuthService {
    async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>> {
        Ok(Self::parse(access_token).map(|user_id| AuthSession {
            user_id,
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: None,
        }))
    }

    async fn refresh_session(&self, token: &str) -> Result<Option<AuthSession>> {
        Ok(Self::parse(token).map(|user_id| {
            // Model the real backend's split: the access token is never the
            // value that refreshes the next request.
            let (access_token, refresh_token) = if self.rotate_on_refresh {
                (format!("{token}:a"), Some(format!("{token}:r")))
            } else {
                (format!("{token}:a"), None)
            };
            AuthSession {
                user_id,
                access_token,
                refresh_token,
                expires_at: None,
            }
        }))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<()> {
        Ok(())
    }

    async fn select_rows(
        &self,
        table: &str,
        _access_token: &str,
        user_id: Uuid,
    ) -> Result<Vec<serde_json::Value>> {
        let rows = self.rows.lock().expect("mock rows lock");
        Ok(rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row["user_id"] == user_id.to_string())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_row(
        &self,
        table: &str,
        _access_token: &str,
        user_id: Uuid,
        mut row: serde_json::Value,
    ) -> Result<()> {
        if let Some(object) = row.as_object_mut() {
            object.insert(
                "user_id".to_string(),
                serde_json::Value::String(user_id.to_string()),
            );
        }
        let mut rows = self.rows.lock().expect("mock rows lock");
        rows.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn delete_rows(
        &self,
        table: &str,
        _access_token: &str,
        user_id: Uuid,
        id: &str,
    ) -> Result<()> {
        let mut rows = self.rows.lock().expect("mock rows lock");
        if let Some(rows) = rows.get_mut(table) {
            rows.retain(|row| {
                let id_matches = row["id"] == id || row["id"].to_string() == id;
                !(row["user_id"] == user_id.to_string() && id_matches)
            });
        }
        Ok(())
    }
}
