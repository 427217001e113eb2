//! Get-or-create JIT provisioning: the first successful broker
//! authentication for a given `broker_did` creates the local user row.

use std::sync::Arc;

use serde_json::json;

use crate::db::{DbResult, UserRepo};
use crate::models::user::BrokerProfile;
use crate::models::User;

pub struct UserService {
    repo: Arc<dyn UserRepo>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepo>) -> Self {
        Self { repo }
    }

    pub async fn get_or_create(&self, profile: &BrokerProfile) -> DbResult<User> {
        if let Some(user) = self.repo.get_by_broker_did(&profile.broker_did).await? {
            return Ok(user);
        }

        self.repo
            .create(
                Some(&profile.broker_did),
                profile.email.as_deref(),
                profile.display_name.as_deref(),
                profile.avatar_url.as_deref(),
                None,
                None,
                json!({}),
                profile.wallet_address.as_deref(),
            )
            .await
    }
}
