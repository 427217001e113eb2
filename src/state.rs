//! Shared application state threaded through every handler via Axum's
//! `State` extractor.

use std::sync::Arc;

use crate::auth::{BrokerVerifier, KeyManager, SessionLayer};
use crate::auth::keys::KeyError;
use crate::config::Config;
use crate::db::DbPool;
use crate::services::{AppService, AuthzCodeService, TokenService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DbPool,
    pub keys: Arc<KeyManager>,
    pub session: Arc<SessionLayer>,
    pub broker: Arc<BrokerVerifier>,
    pub apps: Arc<AppService>,
    pub users: Arc<UserService>,
    pub codes: Arc<AuthzCodeService>,
    pub tokens: Arc<TokenService>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("key manager initialization failed: {0}")]
    Keys(#[from] KeyError),
}

impl AppState {
    /// Wires every singleton (key manager, broker HTTP client, database
    /// pool) and the services built on top of them. Called once at
    /// startup; the result is cheap to clone into every handler after.
    pub async fn new(config: Config) -> Result<Self, StateError> {
        let config = Arc::new(config);

        let db = DbPool::connect(&config.database_url).await?;
        db.run_migrations().await?;

        let keys = Arc::new(KeyManager::load_or_generate(
            config.rsa_private_key_b64.as_deref(),
            config.rsa_public_key_b64.as_deref(),
            &config.keys_dir,
        )?);

        let session = Arc::new(SessionLayer::new(
            config.session_secret.clone(),
            config.session_expiry_seconds,
            !config.frontend_url.starts_with("http://"),
        ));

        let http = reqwest::Client::new();
        let broker = Arc::new(BrokerVerifier::new(
            http,
            config.broker_jwks_url.clone(),
            config.broker_profile_url.clone(),
            config.broker_app_id.clone(),
            config.broker_app_secret.clone(),
            config.broker_issuer.clone(),
        ));

        let apps = Arc::new(AppService::new(db.apps().clone()));
        let users = Arc::new(UserService::new(db.users().clone()));
        let codes = Arc::new(AuthzCodeService::new(
            db.codes().clone(),
            config.authorization_code_expiry_seconds,
        ));
        let tokens = Arc::new(TokenService::new(
            db.apps().clone(),
            db.tokens().clone(),
            keys.clone(),
            config.issuer.clone(),
            config.token_expiry_seconds,
        ));

        Ok(Self {
            config,
            db,
            keys,
            session,
            broker,
            apps,
            users,
            codes,
            tokens,
        })
    }
}
