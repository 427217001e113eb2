//! In-memory fake repositories — swap the repo trait for a test
//! double, adapted to this crate's smaller repo set so the
//! protocol-level invariants can be exercised without a real Postgres
//! instance.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use ns_auth::db::{AppRepo, CodeRepo, DbResult, TokenRepo, UserRepo};
use ns_auth::models::{AccessTokenRecord, AuthorizationCode, OAuthApp, User};

#[derive(Default)]
pub struct FakeAppRepo {
    by_id: Mutex<HashMap<Uuid, OAuthApp>>,
}

impl FakeAppRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppRepo for FakeAppRepo {
    async fn create(
        &self,
        client_id: &str,
        client_secret_hash: &str,
        name: &str,
        description: Option<&str>,
        icon_url: Option<&str>,
        privacy_policy_url: Option<&str>,
        scopes: &[String],
        redirect_uris: &[String],
    ) -> DbResult<OAuthApp> {
        let now = Utc::now();
        let app = OAuthApp {
            id: Uuid::new_v4(),
            client_id: client_id.to_string(),
            client_secret_hash: client_secret_hash.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            icon_url: icon_url.map(str::to_string),
            privacy_policy_url: privacy_policy_url.map(str::to_string),
            scopes: scopes.to_vec(),
            redirect_uris: redirect_uris.to_vec(),
            created_at: now,
            updated_at: now,
        };
        self.by_id.lock().unwrap().insert(app.id, app.clone());
        Ok(app)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<OAuthApp>> {
        Ok(self.by_id.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_client_id(&self, client_id: &str) -> DbResult<Option<OAuthApp>> {
        Ok(self
            .by_id
            .lock()
            .unwrap()
            .values()
            .find(|a| a.client_id == client_id)
            .cloned())
    }

    async fn list(&self) -> DbResult<Vec<OAuthApp>> {
        Ok(self.by_id.lock().unwrap().values().cloned().collect())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        icon_url: Option<&str>,
        privacy_policy_url: Option<&str>,
        scopes: Option<&[String]>,
        redirect_uris: Option<&[String]>,
    ) -> DbResult<Option<OAuthApp>> {
        let mut guard = self.by_id.lock().unwrap();
        let Some(app) = guard.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            app.name = name.to_string();
        }
        if let Some(description) = description {
            app.description = Some(description.to_string());
        }
        if let Some(icon_url) = icon_url {
            app.icon_url = Some(icon_url.to_string());
        }
        if let Some(privacy_policy_url) = privacy_policy_url {
            app.privacy_policy_url = Some(privacy_policy_url.to_string());
        }
        if let Some(scopes) = scopes {
            app.scopes = scopes.to_vec();
        }
        if let Some(redirect_uris) = redirect_uris {
            app.redirect_uris = redirect_uris.to_vec();
        }
        app.updated_at = Utc::now();
        Ok(Some(app.clone()))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        Ok(self.by_id.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct FakeCodeRepo {
    by_code: Mutex<HashMap<String, AuthorizationCode>>,
}

impl FakeCodeRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CodeRepo for FakeCodeRepo {
    async fn create(
        &self,
        code: &str,
        client_id: &str,
        user_id: Uuid,
        redirect_uri: &str,
        scope: &str,
        state: Option<&str>,
        code_challenge: Option<&str>,
        code_challenge_method: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> DbResult<AuthorizationCode> {
        let record = AuthorizationCode {
            code: code.to_string(),
            client_id: client_id.to_string(),
            user_id,
            redirect_uri: redirect_uri.to_string(),
            scope: scope.to_string(),
            state: state.map(str::to_string),
            code_challenge: code_challenge.map(str::to_string),
            code_challenge_method: code_challenge_method.map(str::to_string),
            used: false,
            expires_at,
            created_at: Utc::now(),
        };
        self.by_code
            .lock()
            .unwrap()
            .insert(code.to_string(), record.clone());
        Ok(record)
    }

    async fn get(&self, code: &str) -> DbResult<Option<AuthorizationCode>> {
        Ok(self.by_code.lock().unwrap().get(code).cloned())
    }

    async fn mark_used_if_unused(&self, code: &str) -> DbResult<Option<AuthorizationCode>> {
        let mut guard = self.by_code.lock().unwrap();
        let Some(record) = guard.get_mut(code) else {
            return Ok(None);
        };
        if record.used {
            return Ok(None);
        }
        record.used = true;
        Ok(Some(record.clone()))
    }
}

#[derive(Default)]
pub struct FakeTokenRepo {
    by_hash: Mutex<HashMap<String, AccessTokenRecord>>,
}

impl FakeTokenRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepo for FakeTokenRepo {
    async fn create(
        &self,
        token_hash: &str,
        jti: Uuid,
        client_id: &str,
        user_id: Option<Uuid>,
        scope: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<AccessTokenRecord> {
        let record = AccessTokenRecord {
            token_hash: token_hash.to_string(),
            jti,
            client_id: client_id.to_string(),
            user_id,
            scope: scope.to_string(),
            expires_at,
            revoked: false,
            created_at: Utc::now(),
        };
        self.by_hash
            .lock()
            .unwrap()
            .insert(token_hash.to_string(), record.clone());
        Ok(record)
    }

    async fn get_by_hash(&self, token_hash: &str) -> DbResult<Option<AccessTokenRecord>> {
        Ok(self.by_hash.lock().unwrap().get(token_hash).cloned())
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> DbResult<()> {
        if let Some(record) = self.by_hash.lock().unwrap().get_mut(token_hash) {
            record.revoked = true;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeUserRepo {
    by_id: Mutex<HashMap<Uuid, User>>,
}

impl FakeUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.by_id.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserRepo for FakeUserRepo {
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        Ok(self.by_id.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_broker_did(&self, broker_did: &str) -> DbResult<Option<User>> {
        Ok(self
            .by_id
            .lock()
            .unwrap()
            .values()
            .find(|u| u.broker_did.as_deref() == Some(broker_did))
            .cloned())
    }

    async fn create(
        &self,
        broker_did: Option<&str>,
        email: Option<&str>,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
        cohort: Option<&str>,
        bio: Option<&str>,
        socials: JsonValue,
        wallet_address: Option<&str>,
    ) -> DbResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            broker_did: broker_did.map(str::to_string),
            email: email.map(str::to_string),
            display_name: display_name.map(str::to_string),
            avatar_url: avatar_url.map(str::to_string),
            cohort: cohort.map(str::to_string),
            bio: bio.map(str::to_string),
            socials,
            wallet_address: wallet_address.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        self.by_id.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }
}
