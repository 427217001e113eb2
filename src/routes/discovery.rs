//! Static discovery metadata, keyed off the configured issuer. Every
//! field here is derived from configuration or the fixed scope
//! catalog — nothing is computed per request.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::catalog;
use crate::state::AppState;

pub async fn jwks(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::to_value(state.keys.jwks()).expect("jwks serializes"))
}

pub async fn oauth_authorization_server(State(state): State<AppState>) -> Json<Value> {
    Json(metadata(&state))
}

pub async fn openid_configuration(State(state): State<AppState>) -> Json<Value> {
    Json(metadata(&state))
}

fn metadata(state: &AppState) -> Value {
    let issuer = &state.config.issuer;
    json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/oauth/authorize"),
        "token_endpoint": format!("{issuer}/oauth/token"),
        "userinfo_endpoint": format!("{issuer}/oauth/userinfo"),
        "introspection_endpoint": format!("{issuer}/oauth/token/introspect"),
        "revocation_endpoint": format!("{issuer}/oauth/token/revoke"),
        "jwks_uri": format!("{issuer}/.well-known/jwks.json"),
        "scopes_supported": catalog::all_scope_names(),
        "grant_types_supported": ["client_credentials", "authorization_code"],
        "response_types_supported": ["code"],
        "code_challenge_methods_supported": ["S256", "plain"],
        "token_endpoint_auth_methods_supported": ["client_secret_post", "none"],
        "id_token_signing_alg_values_supported": ["RS256"],
        "subject_types_supported": ["public"],
    })
}
