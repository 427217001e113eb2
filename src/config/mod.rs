//! Environment-driven configuration, all variables prefixed `OAUTH_`.
//!
//! Unlike the gateway's layered TOML configuration, this service's
//! configuration is a flat set of environment variables, so it's read
//! directly into one validated struct rather than assembled from section
//! files.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub token_expiry_seconds: i64,
    pub issuer: String,
    pub keys_dir: String,
    pub uploads_dir: String,
    pub rsa_private_key_b64: Option<String>,
    pub rsa_public_key_b64: Option<String>,
    pub session_secret: String,
    pub session_expiry_seconds: i64,
    pub authorization_code_expiry_seconds: i64,
    pub frontend_url: String,
    pub broker_app_id: String,
    pub broker_app_secret: String,
    pub broker_issuer: String,
    pub broker_jwks_url: String,
    pub broker_profile_url: String,
    pub bind_addr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
    #[error("{0} must be at least {1} characters")]
    TooShort(&'static str, usize),
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_i64_or(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Ok(v) => v.parse().map_err(|_| ConfigError::Invalid(name, v)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env_var("OAUTH_DATABASE_URL")?;
        let cors_origins = env_var_or("OAUTH_CORS_ORIGINS", "")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let token_expiry_seconds = env_i64_or("OAUTH_TOKEN_EXPIRY_SECONDS", 3600)?;
        let issuer = env_var("OAUTH_ISSUER")?;
        let keys_dir = env_var_or("OAUTH_KEYS_DIR", "./keys");
        let uploads_dir = env_var_or("OAUTH_UPLOADS_DIR", "./uploads");
        let rsa_private_key_b64 = env::var("OAUTH_RSA_PRIVATE_KEY").ok();
        let rsa_public_key_b64 = env::var("OAUTH_RSA_PUBLIC_KEY").ok();
        let session_secret = env_var("OAUTH_SESSION_SECRET")?;
        if session_secret.len() < 64 {
            return Err(ConfigError::TooShort("OAUTH_SESSION_SECRET", 64));
        }
        let session_expiry_seconds = env_i64_or("OAUTH_SESSION_EXPIRY_SECONDS", 86400)?;
        let authorization_code_expiry_seconds =
            env_i64_or("OAUTH_AUTHORIZATION_CODE_EXPIRY_SECONDS", 600)?;
        let frontend_url = env_var("OAUTH_FRONTEND_URL")?;
        let broker_app_id = env_var("OAUTH_BROKER_APP_ID")?;
        let broker_app_secret = env_var("OAUTH_BROKER_APP_SECRET")?;
        let broker_issuer = env_var_or("OAUTH_BROKER_ISSUER", "privy.io");
        let broker_jwks_url = env_var("OAUTH_BROKER_JWKS_URL")?;
        let broker_profile_url = env_var("OAUTH_BROKER_PROFILE_URL")?;
        let bind_addr = env_var_or("OAUTH_BIND_ADDR", "0.0.0.0:8080");

        Ok(Config {
            database_url,
            cors_origins,
            token_expiry_seconds,
            issuer,
            keys_dir,
            uploads_dir,
            rsa_private_key_b64,
            rsa_public_key_b64,
            session_secret,
            session_expiry_seconds,
            authorization_code_expiry_seconds,
            frontend_url,
            broker_app_id,
            broker_app_secret,
            broker_issuer,
            broker_jwks_url,
            broker_profile_url,
            bind_addr,
        })
    }

}
