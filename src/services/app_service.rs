//! Thin data management atop the app store: registration CRUD and
//! credential generation. Not part of the protocol-critical core, but
//! every app needs a way to come into existence.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::hashing;
use crate::db::{AppRepo, DbResult};
use crate::models::oauth_app::{CreateOAuthApp, CreatedOAuthApp, UpdateOAuthApp};
use crate::models::OAuthApp;

pub struct AppService {
    repo: Arc<dyn AppRepo>,
}

impl AppService {
    pub fn new(repo: Arc<dyn AppRepo>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: CreateOAuthApp) -> DbResult<CreatedOAuthApp> {
        let client_id = hashing::generate_client_id();
        let client_secret = hashing::generate_client_secret();
        let client_secret_hash =
            hashing::hash_client_secret(&client_secret).expect("bcrypt hashing cannot fail for valid UTF-8 input");

        let app = self
            .repo
            .create(
                &client_id,
                &client_secret_hash,
                &input.name,
                input.description.as_deref(),
                input.icon_url.as_deref(),
                input.privacy_policy_url.as_deref(),
                &input.scopes,
                &input.redirect_uris,
            )
            .await?;

        Ok(CreatedOAuthApp { app, client_secret })
    }

    pub async fn get(&self, id: Uuid) -> DbResult<Option<OAuthApp>> {
        self.repo.get_by_id(id).await
    }

    pub async fn get_by_client_id(&self, client_id: &str) -> DbResult<Option<OAuthApp>> {
        self.repo.get_by_client_id(client_id).await
    }

    pub async fn list(&self) -> DbResult<Vec<OAuthApp>> {
        self.repo.list().await
    }

    pub async fn update(&self, id: Uuid, input: UpdateOAuthApp) -> DbResult<Option<OAuthApp>> {
        self.repo
            .update(
                id,
                input.name.as_deref(),
                input.description.as_deref(),
                input.icon_url.as_deref(),
                input.privacy_policy_url.as_deref(),
                input.scopes.as_deref(),
                input.redirect_uris.as_deref(),
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> DbResult<bool> {
        self.repo.delete(id).await
    }
}
