//! Verification of user tokens issued by the external identity broker.
//!
//! The broker is a trusted collaborator, not reimplemented here: it
//! performs primary authentication and hands back an ES256 JWT plus,
//! on request, a profile payload over HTTP Basic auth. This module
//! only verifies and decodes — any network, parse, or validation
//! failure collapses to "no claims", never surfacing the underlying
//! error kind to callers (which would otherwise be an oracle for
//! probing the broker's internals).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

const JWKS_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct BrokerJwk {
    kid: String,
    crv: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrokerJwks {
    keys: Vec<BrokerJwk>,
}

struct CachedJwks {
    fetched_at: Instant,
    keys: Vec<BrokerJwk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerClaims {
    pub sub: String,
    pub iss: String,
    #[serde(default)]
    pub aud: JsonValue,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

pub struct BrokerVerifier {
    http: Client,
    jwks_url: String,
    profile_url: String,
    app_id: String,
    app_secret: String,
    issuer: String,
    cache: Arc<RwLock<Option<CachedJwks>>>,
}

impl BrokerVerifier {
    pub fn new(http: Client, jwks_url: String, profile_url: String, app_id: String, app_secret: String, issuer: String) -> Self {
        Self {
            http,
            jwks_url,
            profile_url,
            app_id,
            app_secret,
            issuer,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Verifies a broker-issued ES256 token and returns the decoded
    /// claims. Returns `None` on any failure whatsoever.
    pub async fn verify(&self, token: &str) -> Option<BrokerClaims> {
        match self.try_verify(token).await {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "broker token verification failed");
                None
            }
        }
    }

    async fn try_verify(&self, token: &str) -> Result<BrokerClaims, String> {
        let header = decode_header(token).map_err(|e| e.to_string())?;
        let kid = header.kid.ok_or("missing kid")?;
        if header.alg != Algorithm::ES256 {
            return Err("unexpected algorithm".to_string());
        }

        let jwk = self.find_or_refresh(&kid).await.ok_or("unknown kid")?;
        let decoding_key = jwk_to_ec_decoding_key(&jwk)?;

        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_audience(&[&self.app_id]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<BrokerClaims>(token, &decoding_key, &validation)
            .map_err(|e| e.to_string())?;
        Ok(data.claims)
    }

    async fn find_or_refresh(&self, kid: &str) -> Option<BrokerJwk> {
        {
            let guard = self.cache.read().await;
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < JWKS_TTL {
                    if let Some(jwk) = cached.keys.iter().find(|k| k.kid == kid) {
                        return Some(clone_jwk(jwk));
                    }
                }
            }
        }

        let mut guard = self.cache.write().await;
        let needs_refresh = match guard.as_ref() {
            Some(cached) => cached.fetched_at.elapsed() >= JWKS_TTL,
            None => true,
        };
        if needs_refresh {
            match self.fetch_jwks().await {
                Ok(keys) => {
                    *guard = Some(CachedJwks {
                        fetched_at: Instant::now(),
                        keys,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "broker JWKS refresh failed, serving stale cache if present");
                }
            }
        }
        guard.as_ref()?.keys.iter().find(|k| k.kid == kid).map(clone_jwk)
    }

    async fn fetch_jwks(&self) -> Result<Vec<BrokerJwk>, String> {
        let resp = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("unexpected status {}", resp.status()));
        }
        let jwks: BrokerJwks = resp.json().await.map_err(|e| e.to_string())?;
        Ok(jwks.keys)
    }

    /// Fetches the broker's user record for the given subject over
    /// HTTP Basic auth. Only a 200 response yields a result.
    pub async fn fetch_profile(&self, broker_did: &str) -> Option<JsonValue> {
        let url = format!("{}/{}", self.profile_url.trim_end_matches('/'), broker_did);
        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .send()
            .await
            .ok()?;
        if resp.status() != reqwest::StatusCode::OK {
            return None;
        }
        resp.json().await.ok()
    }
}

fn clone_jwk(jwk: &BrokerJwk) -> BrokerJwk {
    BrokerJwk {
        kid: jwk.kid.clone(),
        crv: jwk.crv.clone(),
        x: jwk.x.clone(),
        y: jwk.y.clone(),
    }
}

fn jwk_to_ec_decoding_key(jwk: &BrokerJwk) -> Result<DecodingKey, String> {
    let x = jwk.x.as_deref().ok_or("jwk missing x")?;
    let y = jwk.y.as_deref().ok_or("jwk missing y")?;
    if jwk.crv.as_deref() != Some("P-256") {
        return Err("unsupported curve".to_string());
    }
    DecodingKey::from_ec_components(x, y).map_err(|e| e.to_string())
}
