use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::error::DbResult;
use crate::models::AccessTokenRecord;

#[async_trait]
pub trait TokenRepo: Send + Sync {
    async fn create(
        &self,
        token_hash: &str,
        jti: Uuid,
        client_id: &str,
        user_id: Option<Uuid>,
        scope: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<AccessTokenRecord>;

    async fn get_by_hash(&self, token_hash: &str) -> DbResult<Option<AccessTokenRecord>>;

    /// Idempotent: revoking an absent record is not an error, it's a
    /// no-op, so the caller never learns whether the token existed.
    async fn revoke_by_hash(&self, token_hash: &str) -> DbResult<()>;
}
