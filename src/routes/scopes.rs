use axum::Json;
use serde_json::{json, Value};

use crate::catalog;

pub async fn list_scopes() -> Json<Value> {
    let scopes: Vec<Value> = catalog::SCOPES
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "description": s.description,
                "claims": s.claims,
            })
        })
        .collect();
    Json(json!({ "scopes": scopes }))
}
