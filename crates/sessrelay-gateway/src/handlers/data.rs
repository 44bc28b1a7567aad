//! User-scoped row access endpoints.
//!
//! Thin forwards to the backend's table API: each handler reshapes the
//! request, scopes it by the authenticated user, and returns the backend's
//! rows. Table semantics are the backend's own.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use sessrelay_auth::AuthService;

use crate::error::ApiError;
use crate::gatekeeper::CurrentSession;
use crate::state::GatewayState;

/// Response for listing rows.
#[derive(Debug, Serialize)]
pub struct ListRowsResponse {
    /// The user's rows in the requested table.
    pub rows: Vec<serde_json::Value>,
}

/// List the current user's rows in a table.
///
/// # Errors
///
/// Returns an error if the table name is invalid or the backend call fails.
pub async fn list_rows<A>(
    State(state): State<Arc<GatewayState<A>>>,
    session: CurrentSession,
    Path(table): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AuthService + 'static,
{
    let table = validate_table(&table)?;

    let rows = state
        .auth
        .select_rows(table, &session.access_token, session.user_id)
        .await?;

    Ok(Json(ListRowsResponse { rows }))
}

/// Insert a row into a table, stamped with the current user's ID.
///
/// # Errors
///
/// Returns an error if the table name or body is invalid, or the backend
/// call fails.
pub async fn insert_row<A>(
    State(state): State<Arc<GatewayState<A>>>,
    session: CurrentSession,
    Path(table): Path<String>,
    Json(row): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AuthService + 'static,
{
    let table = validate_table(&table)?;

    if !row.is_object() {
        return Err(ApiError::BadRequest("row must be a JSON object".to_string()));
    }

    state
        .auth
        .insert_row(table, &session.access_token, session.user_id, row)
        .await?;

    Ok(StatusCode::CREATED)
}

/// Delete one of the current user's rows.
///
/// # Errors
///
/// Returns an error if the table name is invalid or the backend call fails.
pub async fn delete_row<A>(
    State(state): State<Arc<GatewayState<A>>>,
    session: CurrentSession,
    Path((table, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AuthService + 'static,
{
    let table = validate_table(&table)?;

    state
        .auth
        .delete_rows(table, &session.access_token, session.user_id, &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Restrict table names to plain identifiers so they cannot smuggle path or
/// query syntax into the backend URL.
fn validate_table(table: &str) -> Result<&str, ApiError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(table)
    } else {
        Err(ApiError::BadRequest(format!("invalid table name: {table}")))
    }
}
