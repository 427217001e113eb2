//! Crate-wide error type for the OAuth/OIDC protocol surface.
//!
//! Every handler returns `Result<_, AppError>`. [`AppError::into_response`]
//! maps each variant to an OAuth-style JSON envelope
//! (`{"error": ..., "error_description": ...}`) and the matching status
//! code. Infrastructure failures are logged with full detail and returned
//! to the client as a generic message — the underlying cause never
//! crosses the wire.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;

use crate::db::DbError;
use crate::services::CreateCodeError;

#[derive(Debug)]
pub enum AppError {
    /// `invalid_request` — missing or malformed parameters.
    InvalidRequest(String),
    /// `invalid_client` — unknown client_id or failed secret verification.
    InvalidClient,
    /// `invalid_grant` — authorization-code checks failed, PKCE mismatch, expired code.
    InvalidGrant,
    /// `invalid_token` — bearer token missing, inactive, or lacks required context.
    InvalidToken,
    /// `unsupported_grant_type`
    UnsupportedGrantType,
    /// `unsupported_response_type`
    UnsupportedResponseType,
    /// `not_authenticated` — no valid session.
    NotAuthenticated,
    /// `user_not_found` — session referenced a user that no longer exists.
    UserNotFound,
    /// Infrastructure failure. Detail is logged, never returned.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    error_description: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
            AppError::InvalidClient => (
                StatusCode::UNAUTHORIZED,
                "invalid_client",
                "Invalid client credentials".to_string(),
            ),
            AppError::InvalidGrant => (
                StatusCode::BAD_REQUEST,
                "invalid_grant",
                "The authorization grant is invalid, expired, or was already used".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "The access token is missing, invalid, or expired".to_string(),
            ),
            AppError::UnsupportedGrantType => (
                StatusCode::BAD_REQUEST,
                "unsupported_grant_type",
                "The requested grant_type is not supported".to_string(),
            ),
            AppError::UnsupportedResponseType => (
                StatusCode::BAD_REQUEST,
                "unsupported_response_type",
                "The requested response_type is not supported".to_string(),
            ),
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "not_authenticated",
                "No valid session".to_string(),
            ),
            AppError::UserNotFound => (
                StatusCode::UNAUTHORIZED,
                "user_not_found",
                "Session user no longer exists".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "An internal error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(error = %detail, "internal error");
        }
        let (status, code, description) = self.parts();
        let body = ErrorBody {
            error: code,
            error_description: description,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (_, code, description) = self.parts();
        write!(f, "{code}: {description}")
    }
}

impl std::error::Error for AppError {}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<CreateCodeError> for AppError {
    fn from(e: CreateCodeError) -> Self {
        match e {
            CreateCodeError::UnsupportedChallengeMethod => {
                AppError::InvalidRequest("unsupported code_challenge_method".to_string())
            }
            CreateCodeError::Db(e) => e.into(),
        }
    }
}
