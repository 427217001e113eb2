use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::{DbError, DbResult};
use crate::db::repos::TokenRepo;
use crate::models::AccessTokenRecord;

pub struct PgTokenRepo {
    pool: PgPool,
}

impl PgTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepo for PgTokenRepo {
    async fn create(
        &self,
        token_hash: &str,
        jti: Uuid,
        client_id: &str,
        user_id: Option<Uuid>,
        scope: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<AccessTokenRecord> {
        sqlx::query_as::<_, AccessTokenRecord>(
            r#"
            INSERT INTO access_tokens
                (token_hash, jti, client_id, user_id, scope, expires_at, revoked, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, false, now())
            RETURNING *
            "#,
        )
        .bind(token_hash)
        .bind(jti)
        .bind(client_id)
        .bind(user_id)
        .bind(scope)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)
    }

    async fn get_by_hash(&self, token_hash: &str) -> DbResult<Option<AccessTokenRecord>> {
        sqlx::query_as::<_, AccessTokenRecord>("SELECT * FROM access_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> DbResult<()> {
        sqlx::query("UPDATE access_tokens SET revoked = true WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }
}
