use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::error::DbResult;
use crate::models::AuthorizationCode;

#[async_trait]
pub trait CodeRepo: Send + Sync {
    #[allow(clippy::too_many_arguments)]
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
    ) -> DbResult<AuthorizationCode>;

    async fn get(&self, code: &str) -> DbResult<Option<AuthorizationCode>>;

    /// Atomically marks the code used, returning it only if the update
    /// affected a row (i.e. the code was previously unused). Two
    /// concurrent callers racing on the same code: at most one gets
    /// `Some`.
    async fn mark_used_if_unused(&self, code: &str) -> DbResult<Option<AuthorizationCode>>;
}
