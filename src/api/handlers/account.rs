//! Self-service account deletion.
//!
//! Flow Overview:
//! 1) Read the bearer token from the `Authorization` header.
//! 2) Resolve it to a user with the service-role client.
//! 3) Delete that user with the service-role client.
//!
//! Possession of a valid access token is the only proof required; there is no
//! re-authentication step. Token failures are reported generically while
//! delete failures carry the backend's message.

use crate::supabase::IdentityBackend;
use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

pub const NO_AUTHORIZATION_HEADER: &str = "No authorization header";
pub const INVALID_TOKEN: &str = "Invalid token";

const BEARER_PREFIX: &str = "Bearer ";

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct DeleteAccountResponse {
    pub success: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[utoipa::path(
    delete,
    path = "/api/delete-user",
    responses(
        (status = 200, description = "Account deleted.", body = DeleteAccountResponse),
        (status = 401, description = "Missing authorization header or invalid token.", body = ErrorResponse),
        (status = 500, description = "The identity backend failed to delete the account.", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "account"
)]
#[instrument(skip_all)]
pub async fn delete_account(
    headers: HeaderMap,
    backend: Extension<Arc<dyn IdentityBackend>>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, NO_AUTHORIZATION_HEADER);
    };

    let user = match backend.get_user(&token).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!("Token did not resolve to a user");
            return error_response(StatusCode::UNAUTHORIZED, INVALID_TOKEN);
        }
        Err(err) => {
            debug!("Token rejected by identity backend: {err}");
            return error_response(StatusCode::UNAUTHORIZED, INVALID_TOKEN);
        }
    };

    if let Err(err) = backend.delete_user(&user.id).await {
        error!(user_id = %user.id, "Failed to delete user: {err}");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string());
    }

    info!(user_id = %user.id, "Account deleted");

    (StatusCode::OK, Json(DeleteAccountResponse { success: true })).into_response()
}

/// Raw token from the `Authorization` header.
///
/// A missing or empty header yields `None`. The `Bearer ` prefix is removed
/// when present; any other value is returned unchanged for the backend to
/// reject.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?;
    if value.is_empty() {
        return None;
    }

    let value = String::from_utf8_lossy(value.as_bytes());
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(&value);

    Some(token.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
