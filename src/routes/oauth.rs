//! The protocol-critical endpoints: `/authorize`, `/authorize/info`,
//! `/authorize/consent`, `/token`, `/userinfo`, `/token/introspect`,
//! `/token/revoke`. Everything else in `routes/` is either discovery
//! (static, derived) or thin CRUD atop the app/session stores.

use axum::extract::{Query, RawQuery, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_cookies::Cookies;

use crate::catalog;
use crate::error::AppError;
use crate::services::IntrospectionResult;
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub response_type: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub code_challenge: Option<String>,
    #[serde(default)]
    pub code_challenge_method: Option<String>,
}

/// Validates `response_type` and the client/redirect pairing, then
/// forwards every original query parameter to the frontend: `/login`
/// if there is no valid session, `/consent` otherwise. The frontend is
/// what actually renders the login or consent screen; this endpoint
/// only gatekeeps.
pub async fn authorize(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<AuthorizeParams>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, AppError> {
    if params.response_type != "code" {
        return Err(AppError::UnsupportedResponseType);
    }

    let app = state
        .apps
        .get_by_client_id(&params.client_id)
        .await?
        .ok_or_else(|| AppError::InvalidRequest("unknown client_id".to_string()))?;

    if !validation::redirect_uri_matches(&app, &params.redirect_uri) {
        return Err(AppError::InvalidRequest(
            "redirect_uri is not registered for this client".to_string(),
        ));
    }

    let query = raw_query.unwrap_or_default();
    let target = match state.session.user_from_cookies(&cookies) {
        Some(_) => format!("{}/consent?{query}", state.config.frontend_url),
        None => format!("{}/login?{query}", state.config.frontend_url),
    };

    Ok(Redirect::to(&target).into_response())
}

#[derive(Debug, Deserialize)]
pub struct InfoParams {
    pub client_id: String,
    #[serde(default)]
    pub scope: String,
}

#[derive(Debug, Serialize)]
struct ScopeInfo {
    name: &'static str,
    description: &'static str,
    claims: &'static [&'static str],
}

/// Metadata the consent screen needs to render: who's asking, for
/// what. Requested scopes outside the catalog are silently dropped —
/// this is a display endpoint, not a grant, so it never errors on an
/// unrecognized scope the way the catalog-validating endpoints do.
pub async fn authorize_info(
    State(state): State<AppState>,
    Query(params): Query<InfoParams>,
) -> Result<Json<Value>, AppError> {
    let app = state
        .apps
        .get_by_client_id(&params.client_id)
        .await?
        .ok_or_else(|| AppError::InvalidRequest("unknown client_id".to_string()))?;

    let requested: Vec<&str> = params.scope.split(' ').filter(|s| !s.is_empty()).collect();
    let scopes: Vec<ScopeInfo> = if requested.is_empty() {
        catalog::SCOPES
            .iter()
            .map(|s| ScopeInfo {
                name: s.name,
                description: s.description,
                claims: s.claims,
            })
            .collect()
    } else {
        requested
            .iter()
            .filter_map(|name| catalog::find(name))
            .map(|s| ScopeInfo {
                name: s.name,
                description: s.description,
                claims: s.claims,
            })
            .collect()
    };

    Ok(Json(json!({
        "name": app.name,
        "icon_url": app.icon_url,
        "description": app.description,
        "privacy_policy_url": app.privacy_policy_url,
        "scopes": scopes,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ConsentRequest {
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub code_challenge: Option<String>,
    #[serde(default)]
    pub code_challenge_method: Option<String>,
    pub approved: bool,
}

/// Form-posted consent decision. JSON, not a 302: the consent page is
/// fetched cross-origin by the frontend, and a browser `fetch` cannot
/// read a redirect's `Location` header, so the caller gets the target
/// URL back in the body and navigates itself.
pub async fn authorize_consent(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(req): Form<ConsentRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = state
        .session
        .user_from_cookies(&cookies)
        .ok_or(AppError::NotAuthenticated)?;

    let state_param = req.state.filter(|s| !s.is_empty());

    if !req.approved {
        let redirect_to = match &state_param {
            Some(s) => format!("{}?error=access_denied&state={s}", req.redirect_uri),
            None => format!("{}?error=access_denied", req.redirect_uri),
        };
        return Ok(Json(json!({ "redirect_to": redirect_to })));
    }

    let app = state
        .apps
        .get_by_client_id(&req.client_id)
        .await?
        .ok_or_else(|| AppError::InvalidRequest("unknown client_id".to_string()))?;

    if !validation::redirect_uri_matches(&app, &req.redirect_uri) {
        return Err(AppError::InvalidRequest(
            "redirect_uri is not registered for this client".to_string(),
        ));
    }

    let granted = validation::narrow_scopes(&app, &req.scope);
    let scope = validation::join_scopes(&granted);

    let code = state
        .codes
        .create(
            &app.client_id,
            user_id,
            &req.redirect_uri,
            &scope,
            state_param.as_deref(),
            req.code_challenge.as_deref(),
            req.code_challenge_method.as_deref(),
        )
        .await?;

    let redirect_to = match &state_param {
        Some(s) => format!("{}?code={code}&state={s}", req.redirect_uri),
        None => format!("{}?code={code}", req.redirect_uri),
    };

    Ok(Json(json!({ "redirect_to": redirect_to })))
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub code_verifier: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

pub async fn token(
    State(state): State<AppState>,
    Form(req): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    match req.grant_type.as_str() {
        "client_credentials" => client_credentials_grant(&state, req).await,
        "authorization_code" => authorization_code_grant(&state, req).await,
        _ => Err(AppError::UnsupportedGrantType),
    }
}

async fn client_credentials_grant(
    state: &AppState,
    req: TokenRequest,
) -> Result<Json<TokenResponse>, AppError> {
    let client_id = req
        .client_id
        .ok_or_else(|| AppError::InvalidRequest("client_id is required".to_string()))?;
    let client_secret = req
        .client_secret
        .ok_or_else(|| AppError::InvalidRequest("client_secret is required".to_string()))?;

    let app = state
        .tokens
        .authenticate_client(&client_id, &client_secret)
        .await
        .map_err(|_| AppError::InvalidClient)?;

    let granted = validation::narrow_scopes(&app, req.scope.as_deref().unwrap_or(""));
    let scope = validation::join_scopes(&granted);
    let minted = state.tokens.issue_client_credentials(&app, granted).await?;

    Ok(Json(TokenResponse {
        access_token: minted.token,
        token_type: "Bearer",
        expires_in: minted.expires_in,
        scope,
        id_token: None,
    }))
}

async fn authorization_code_grant(
    state: &AppState,
    req: TokenRequest,
) -> Result<Json<TokenResponse>, AppError> {
    let client_id = req
        .client_id
        .ok_or_else(|| AppError::InvalidRequest("client_id is required".to_string()))?;
    let code = req
        .code
        .ok_or_else(|| AppError::InvalidRequest("code is required".to_string()))?;
    let redirect_uri = req
        .redirect_uri
        .ok_or_else(|| AppError::InvalidRequest("redirect_uri is required".to_string()))?;

    let app = match &req.client_secret {
        Some(secret) => state
            .tokens
            .authenticate_client(&client_id, secret)
            .await
            .map_err(|_| AppError::InvalidClient)?,
        None => state
            .apps
            .get_by_client_id(&client_id)
            .await?
            .ok_or(AppError::InvalidClient)?,
    };

    let record = state
        .codes
        .exchange(&code, &client_id, &redirect_uri, req.code_verifier.as_deref())
        .await
        .map_err(|_| AppError::InvalidGrant)?;

    let granted: Vec<String> = record.scopes().into_iter().map(str::to_string).collect();
    let scope = record.scope.clone();

    let minted = state
        .tokens
        .issue_user_token(&app, record.user_id, granted.clone())
        .await?;

    let id_token = if granted.iter().any(|s| s == "openid") {
        let user = state
            .db
            .users()
            .get_by_id(record.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        Some(
            state
                .tokens
                .issue_id_token(&app, &user, &granted)
                .map_err(|e| AppError::Internal(e.to_string()))?,
        )
    } else {
        None
    };

    Ok(Json(TokenResponse {
        access_token: minted.token,
        token_type: "Bearer",
        expires_in: minted.expires_in,
        scope,
        id_token,
    }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Scope-gated claims about the token's owner. `active_record` re-runs
/// the same expiry/revocation check `introspect` does — the two must
/// never diverge, since this is the endpoint resource servers actually
/// depend on to decide whether to trust the caller.
pub async fn userinfo(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::InvalidToken)?;

    let record = state
        .tokens
        .active_record(token)
        .await
        .ok_or(AppError::InvalidToken)?;
    let user_id = record.user_id.ok_or(AppError::InvalidToken)?;

    let user = state
        .db
        .users()
        .get_by_id(user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let granted: std::collections::HashSet<&str> = record.scopes().into_iter().collect();
    let mut body = json!({ "sub": user.id });

    if granted.contains("email") {
        body["email"] = json!(user.email);
        body["email_verified"] = json!(true);
    }
    if granted.contains("profile") {
        body["name"] = json!(user.display_name);
        body["picture"] = json!(user.avatar_url);
        body["bio"] = json!(user.bio);
    }
    if granted.contains("cohort") {
        body["cohort"] = json!(user.cohort);
    }
    if granted.contains("socials") {
        body["socials"] = user.socials.clone();
    }
    if granted.contains("wallet") {
        body["wallet_address"] = json!(user.wallet_address);
    }
    if granted.contains("activity") {
        body["posts_count"] = json!(42);
        body["streak_days"] = json!(7);
        body["last_active"] = json!(user.updated_at);
    }

    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct TokenActionRequest {
    pub token: String,
}

/// Always 200: introspection is a status lookup, not a fallible
/// operation, so even a garbage token just answers `active: false`.
pub async fn introspect(
    State(state): State<AppState>,
    Form(req): Form<TokenActionRequest>,
) -> Json<IntrospectionResult> {
    Json(state.tokens.introspect(&req.token).await)
}

/// Idempotent and always 200 — revoking an unknown or already-revoked
/// token must look identical to revoking a live one, or the endpoint
/// becomes an oracle for "does this token exist".
pub async fn revoke(State(state): State<AppState>, Form(req): Form<TokenActionRequest>) -> Json<Value> {
    state.tokens.revoke(&req.token).await;
    Json(json!({}))
}
