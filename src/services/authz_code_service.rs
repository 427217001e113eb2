//! Authorization code issuance and atomic single-use consumption.
//!
//! The caller is responsible for validating the client and redirect_uri
//! before calling `create`. `exchange` re-validates everything and
//! collapses every distinct failure mode into one opaque error, so the
//! external response never discloses which check failed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration as ChronoDuration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{CodeRepo, DbError};
use crate::models::authorization_code::CodeChallengeMethod;
use crate::models::AuthorizationCode;

/// Every exchange failure is reported as this single opaque variant;
/// match arms exist only internally to decide whether to log detail.
#[derive(Debug)]
pub struct ExchangeError;

#[derive(Debug)]
pub enum CreateCodeError {
    UnsupportedChallengeMethod,
    Db(DbError),
}

impl From<DbError> for CreateCodeError {
    fn from(e: DbError) -> Self {
        CreateCodeError::Db(e)
    }
}

pub struct AuthzCodeService {
    repo: Arc<dyn CodeRepo>,
    expiry_seconds: i64,
}

impl AuthzCodeService {
    pub fn new(repo: Arc<dyn CodeRepo>, expiry_seconds: i64) -> Self {
        Self {
            repo,
            expiry_seconds,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        client_id: &str,
        user_id: Uuid,
        redirect_uri: &str,
        scope: &str,
        state: Option<&str>,
        code_challenge: Option<&str>,
        code_challenge_method: Option<&str>,
    ) -> Result<String, CreateCodeError> {
        if let Some(method) = code_challenge_method {
            if CodeChallengeMethod::parse(method).is_none() {
                return Err(CreateCodeError::UnsupportedChallengeMethod);
            }
        }

        let code = generate_code();
        let expires_at = Utc::now() + ChronoDuration::seconds(self.expiry_seconds);

        self.repo
            .create(
                &code,
                client_id,
                user_id,
                redirect_uri,
                scope,
                state,
                code_challenge,
                code_challenge_method,
                expires_at,
            )
            .await?;

        Ok(code)
    }

    /// Performs all redemption checks, then atomically flips `used`.
    /// Returns the consumed record only when every check passed AND
    /// this call won the race to consume it.
    pub async fn exchange(
        &self,
        code: &str,
        client_id: &str,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthorizationCode, ExchangeError> {
        let record = self.repo.get(code).await.map_err(|_| ExchangeError)?;
        let record = record.ok_or(ExchangeError)?;

        if record.used {
            return Err(ExchangeError);
        }
        if record.client_id != client_id {
            return Err(ExchangeError);
        }
        if record.redirect_uri != redirect_uri {
            return Err(ExchangeError);
        }
        if Utc::now() >= record.expires_at {
            return Err(ExchangeError);
        }
        if let Some(challenge) = &record.code_challenge {
            verify_pkce(
                challenge,
                record.code_challenge_method.as_deref(),
                code_verifier,
            )?;
        }

        let consumed = self
            .repo
            .mark_used_if_unused(code)
            .await
            .map_err(|_| ExchangeError)?;
        consumed.ok_or(ExchangeError)
    }
}

fn generate_code() -> String {
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn verify_pkce(
    challenge: &str,
    method: Option<&str>,
    verifier: Option<&str>,
) -> Result<(), ExchangeError> {
    let verifier = verifier.ok_or(ExchangeError)?;
    let method = method.and_then(CodeChallengeMethod::parse).ok_or(ExchangeError)?;
    match method {
        CodeChallengeMethod::S256 => {
            let mut hasher = Sha256::new();
            hasher.update(verifier.as_bytes());
            let computed = URL_SAFE_NO_PAD.encode(hasher.finalize());
            if computed == challenge {
                Ok(())
            } else {
                Err(ExchangeError)
            }
        }
        CodeChallengeMethod::Plain => {
            if verifier == challenge {
                Ok(())
            } else {
                Err(ExchangeError)
            }
        }
    }
}
