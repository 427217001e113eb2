//! RS256 access/ID token minting, introspection, and revocation.
//!
//! Introspection and revocation are both keyed by the SHA-256
//! fingerprint of the exact serialized JWT — any drift between the
//! string handed to the encoder and the string fingerprinted here
//! would silently break revocation, so callers must always fingerprint
//! the literal token returned by `issue_*`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::auth::hashing;
use crate::auth::keys::KeyManager;
use crate::db::{AppRepo, DbError, TokenRepo};
use crate::models::{AccessTokenRecord, OAuthApp, User};

pub struct TokenService {
    apps: Arc<dyn AppRepo>,
    tokens: Arc<dyn TokenRepo>,
    keys: Arc<KeyManager>,
    issuer: String,
    token_expiry_seconds: i64,
}

#[derive(Debug, Serialize)]
struct AccessTokenClaims {
    iss: String,
    sub: String,
    aud: String,
    iat: i64,
    exp: i64,
    jti: Uuid,
    scope: String,
    client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct IdTokenClaims {
    iss: String,
    sub: Uuid,
    aud: String,
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    extra: HashMap<String, JsonValue>,
}

#[derive(Debug, Serialize)]
pub struct MintedToken {
    pub token: String,
    pub jti: Uuid,
    pub scope: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IntrospectionResult {
    Active {
        active: bool,
        scope: String,
        client_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_id: Option<Uuid>,
        token_type: &'static str,
        exp: i64,
        iat: i64,
        jti: Uuid,
        iss: String,
    },
    Inactive {
        active: bool,
    },
}

impl TokenService {
    pub fn new(
        apps: Arc<dyn AppRepo>,
        tokens: Arc<dyn TokenRepo>,
        keys: Arc<KeyManager>,
        issuer: String,
        token_expiry_seconds: i64,
    ) -> Self {
        Self {
            apps,
            tokens,
            keys,
            issuer,
            token_expiry_seconds,
        }
    }

    pub async fn authenticate_client(
        &self,
        client_id: &str,
        secret: &str,
    ) -> Result<OAuthApp, DbError> {
        let app = self.apps.get_by_client_id(client_id).await?;
        match app {
            Some(app) if hashing::verify_client_secret(secret, &app.client_secret_hash) => Ok(app),
            _ => Err(DbError::NotFound),
        }
    }

    fn sign(&self, claims: &impl Serialize) -> Result<String, jsonwebtoken::errors::Error> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(KeyManager::kid().to_string());
        let pem = self
            .keys
            .private_key_pem()
            .expect("key manager holds a valid RSA private key");
        encode(&header, claims, &EncodingKey::from_rsa_pem(pem.as_bytes())?)
    }

    pub async fn issue_client_credentials(
        &self,
        app: &OAuthApp,
        granted: Vec<String>,
    ) -> Result<MintedToken, DbError> {
        self.issue(app, None, granted).await
    }

    pub async fn issue_user_token(
        &self,
        app: &OAuthApp,
        user_id: Uuid,
        granted: Vec<String>,
    ) -> Result<MintedToken, DbError> {
        self.issue(app, Some(user_id), granted).await
    }

    async fn issue(
        &self,
        app: &OAuthApp,
        user_id: Option<Uuid>,
        granted: Vec<String>,
    ) -> Result<MintedToken, DbError> {
        let now = Utc::now();
        let jti = Uuid::new_v4();
        let scope = granted.join(" ");
        let sub = user_id.map(|u| u.to_string()).unwrap_or_else(|| app.client_id.clone());

        let claims = AccessTokenClaims {
            iss: self.issuer.clone(),
            sub,
            aud: app.client_id.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.token_expiry_seconds,
            jti,
            scope: scope.clone(),
            client_id: app.client_id.clone(),
            user_id,
        };

        let token = self
            .sign(&claims)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let token_hash = hashing::hash_token(&token);
        let expires_at = now + ChronoDuration::seconds(self.token_expiry_seconds);

        self.tokens
            .create(&token_hash, jti, &app.client_id, user_id, &scope, expires_at)
            .await?;

        Ok(MintedToken {
            token,
            jti,
            scope,
            expires_in: self.token_expiry_seconds,
        })
    }

    /// ID tokens are client-only assertions, never persisted.
    pub fn issue_id_token(
        &self,
        app: &OAuthApp,
        user: &User,
        granted: &[String],
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let granted: std::collections::HashSet<&str> = granted.iter().map(String::as_str).collect();
        let mut extra = HashMap::new();

        if granted.contains("email") {
            if let Some(email) = &user.email {
                extra.insert("email".to_string(), JsonValue::String(email.clone()));
                extra.insert("email_verified".to_string(), JsonValue::Bool(true));
            }
        }
        if granted.contains("profile") {
            if let Some(name) = &user.display_name {
                extra.insert("name".to_string(), JsonValue::String(name.clone()));
            }
            if let Some(picture) = &user.avatar_url {
                extra.insert("picture".to_string(), JsonValue::String(picture.clone()));
            }
        }
        if granted.contains("cohort") {
            if let Some(cohort) = &user.cohort {
                extra.insert("cohort".to_string(), JsonValue::String(cohort.clone()));
            }
        }
        if granted.contains("wallet") {
            if let Some(wallet) = &user.wallet_address {
                extra.insert("wallet_address".to_string(), JsonValue::String(wallet.clone()));
            }
        }

        let claims = IdTokenClaims {
            iss: self.issuer.clone(),
            sub: user.id,
            aud: app.client_id.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.token_expiry_seconds,
            extra,
        };

        self.sign(&claims)
    }

    pub async fn introspect(&self, token: &str) -> IntrospectionResult {
        let hash = hashing::hash_token(token);
        let record = match self.tokens.get_by_hash(&hash).await {
            Ok(Some(record)) => record,
            _ => return IntrospectionResult::Inactive { active: false },
        };

        if !record.is_active(Utc::now()) {
            return IntrospectionResult::Inactive { active: false };
        }

        IntrospectionResult::Active {
            active: true,
            scope: record.scope.clone(),
            client_id: record.client_id.clone(),
            user_id: record.user_id,
            token_type: "Bearer",
            exp: record.expires_at.timestamp(),
            iat: record.created_at.timestamp(),
            jti: record.jti,
            iss: self.issuer.clone(),
        }
    }

    /// Idempotent — an absent record is accepted silently, exactly like
    /// an already-revoked one, so the caller learns nothing about
    /// whether the token ever existed.
    pub async fn revoke(&self, token: &str) {
        let hash = hashing::hash_token(token);
        let _ = self.tokens.revoke_by_hash(&hash).await;
    }

    pub async fn active_record(&self, token: &str) -> Option<AccessTokenRecord> {
        let hash = hashing::hash_token(token);
        let record = self.tokens.get_by_hash(&hash).await.ok().flatten()?;
        if record.is_active(Utc::now()) {
            Some(record)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn introspection_inactive_serializes_without_extra_fields() {
        let result = IntrospectionResult::Inactive { active: false };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"active": false}));
    }
}
