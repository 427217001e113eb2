use async_trait::async_trait;
use uuid::Uuid;

use crate::db::error::DbResult;
use crate::models::OAuthApp;

#[async_trait]
pub trait AppRepo: Send + Sync {
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
    ) -> DbResult<OAuthApp>;

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<OAuthApp>>;

    async fn get_by_client_id(&self, client_id: &str) -> DbResult<Option<OAuthApp>>;

    async fn list(&self) -> DbResult<Vec<OAuthApp>>;

    #[allow(clippy::too_many_arguments)]
    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        icon_url: Option<&str>,
        privacy_policy_url: Option<&str>,
        scopes: Option<&[String]>,
        redirect_uris: Option<&[String]>,
    ) -> DbResult<Option<OAuthApp>>;

    async fn delete(&self, id: Uuid) -> DbResult<bool>;
}
