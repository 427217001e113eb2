use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::catalog;
use crate::error::AppError;
use crate::models::oauth_app::{CreateOAuthApp, CreatedOAuthApp, UpdateOAuthApp};
use crate::models::OAuthApp;
use crate::state::AppState;

pub async fn create_app(
    State(state): State<AppState>,
    Json(input): Json<CreateOAuthApp>,
) -> Result<(StatusCode, Json<CreatedOAuthApp>), AppError> {
    for scope in &input.scopes {
        if !catalog::is_known(scope) {
            return Err(AppError::InvalidRequest(format!("unknown scope: {scope}")));
        }
    }
    let created = state.apps.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_apps(State(state): State<AppState>) -> Result<Json<Vec<OAuthApp>>, AppError> {
    Ok(Json(state.apps.list().await?))
}

pub async fn get_app(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OAuthApp>, AppError> {
    state
        .apps
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::InvalidRequest("app not found".to_string()))
}

pub async fn update_app(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateOAuthApp>,
) -> Result<Json<OAuthApp>, AppError> {
    if let Some(scopes) = &input.scopes {
        for scope in scopes {
            if !catalog::is_known(scope) {
                return Err(AppError::InvalidRequest(format!("unknown scope: {scope}")));
            }
        }
    }
    state
        .apps
        .update(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::InvalidRequest("app not found".to_string()))
}

pub async fn delete_app(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.apps.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::InvalidRequest("app not found".to_string()))
    }
}
