//! Icon upload. Out of the protocol core, but every app registration
//! needs somewhere to put its icon, so this keeps the original's
//! content-type allowlist and size cap.

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

const MAX_ICON_BYTES: usize = 2 * 1024 * 1024;

const ALLOWED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
];

pub async fn upload_icon(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?
        .ok_or_else(|| AppError::InvalidRequest("missing file field".to_string()))?;

    let content_type = field
        .content_type()
        .ok_or_else(|| AppError::InvalidRequest("missing content type".to_string()))?
        .to_string();

    let extension = ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| AppError::InvalidRequest(format!("unsupported content type: {content_type}")))?;

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    if bytes.len() > MAX_ICON_BYTES {
        return Err(AppError::InvalidRequest("icon exceeds 2MB limit".to_string()));
    }

    let filename = format!("{}.{extension}", Uuid::new_v4());
    let path = std::path::Path::new(&state.config.uploads_dir).join(&filename);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "icon_url": format!("/uploads/{filename}") })))
}
