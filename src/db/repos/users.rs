use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::db::error::DbResult;
use crate::models::User;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>>;

    async fn get_by_broker_did(&self, broker_did: &str) -> DbResult<Option<User>>;

    #[allow(clippy::too_many_arguments)]
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
    ) -> DbResult<User>;
}
