//! Session endpoints: exchange a verified broker token for a local
//! session cookie, report the current session's user, and log out.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::models::user::BrokerProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub broker_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: uuid::Uuid,
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let claims = state
        .broker
        .verify(&req.broker_token)
        .await
        .ok_or(AppError::InvalidToken)?;

    let profile_payload = state.broker.fetch_profile(&claims.sub).await;
    let profile = BrokerProfile {
        broker_did: claims.sub.clone(),
        email: profile_payload
            .as_ref()
            .and_then(|p| p.get("email"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| {
                claims
                    .extra
                    .get("email")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            }),
        display_name: profile_payload
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        avatar_url: profile_payload
            .as_ref()
            .and_then(|p| p.get("avatar_url"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        wallet_address: profile_payload
            .as_ref()
            .and_then(|p| p.get("wallet_address"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
    };

    let user = state.users.get_or_create(&profile).await?;

    state
        .session
        .set_cookie(&cookies, user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse { user_id: user.id }))
}

pub async fn me(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<crate::models::User>, AppError> {
    let user_id = state
        .session
        .user_from_cookies(&cookies)
        .ok_or(AppError::NotAuthenticated)?;

    state
        .db
        .users()
        .get_by_id(user_id)
        .await?
        .map(Json)
        .ok_or(AppError::UserNotFound)
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Json<serde_json::Value> {
    state.session.clear_cookie(&cookies);
    Json(serde_json::json!({}))
}
