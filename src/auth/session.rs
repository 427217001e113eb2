//! HS256 session cookie minting and verification.
//!
//! Sessions are stateless: the cookie itself is the authority, no
//! database row backs it. Any parse, signature, or shape failure
//! collapses to "no session" — callers never learn which check failed.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::{Duration as CookieDuration, SameSite};
use uuid::Uuid;

use crate::models::SessionClaims;

pub const COOKIE_NAME: &str = "ns_session";

pub struct SessionLayer {
    secret: String,
    expiry_seconds: i64,
    secure: bool,
}

impl SessionLayer {
    pub fn new(secret: String, expiry_seconds: i64, secure: bool) -> Self {
        Self {
            secret,
            expiry_seconds,
            secure,
        }
    }

    pub fn mint(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.expiry_seconds,
            kind: SessionClaims::TYPE.to_string(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Returns the session user id, or `None` on any verification
    /// failure — expired, malformed, wrong type, unparsable subject.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .ok()?;
        if data.claims.kind != SessionClaims::TYPE {
            return None;
        }
        Uuid::parse_str(&data.claims.sub).ok()
    }

    pub fn set_cookie(&self, cookies: &Cookies, user_id: Uuid) -> Result<(), jsonwebtoken::errors::Error> {
        let token = self.mint(user_id)?;
        let cookie = Cookie::build((COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(CookieDuration::seconds(self.expiry_seconds))
            .build();
        cookies.add(cookie);
        Ok(())
    }

    pub fn clear_cookie(&self, cookies: &Cookies) {
        let mut cookie = Cookie::from(COOKIE_NAME);
        cookie.set_path("/");
        cookies.remove(cookie);
    }

    pub fn user_from_cookies(&self, cookies: &Cookies) -> Option<Uuid> {
        let cookie = cookies.get(COOKIE_NAME)?;
        self.verify(cookie.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> SessionLayer {
        SessionLayer::new("a".repeat(64), 86400, false)
    }

    #[test]
    fn mint_then_verify_round_trips() {
        let layer = layer();
        let user_id = Uuid::new_v4();
        let token = layer.mint(user_id).unwrap();
        assert_eq!(layer.verify(&token), Some(user_id));
    }

    #[test]
    fn tampered_token_fails_verification() {
        let layer = layer();
        let token = layer.mint(Uuid::new_v4()).unwrap();
        let tampered = format!("{token}x");
        assert_eq!(layer.verify(&tampered), None);
    }

    #[test]
    fn wrong_signing_secret_fails_verification() {
        let a = SessionLayer::new("a".repeat(64), 86400, false);
        let b = SessionLayer::new("b".repeat(64), 86400, false);
        let token = a.mint(Uuid::new_v4()).unwrap();
        assert_eq!(b.verify(&token), None);
    }

    #[test]
    fn expired_token_fails_verification() {
        let layer = SessionLayer::new("a".repeat(64), -10, false);
        let token = layer.mint(Uuid::new_v4()).unwrap();
        assert_eq!(layer.verify(&token), None);
    }
}
