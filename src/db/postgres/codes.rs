use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::{DbError, DbResult};
use crate::db::repos::CodeRepo;
use crate::models::AuthorizationCode;

pub struct PgCodeRepo {
    pool: PgPool,
}

impl PgCodeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeRepo for PgCodeRepo {
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
        sqlx::query_as::<_, AuthorizationCode>(
            r#"
            INSERT INTO authorization_codes
                (code, client_id, user_id, redirect_uri, scope, state,
                 code_challenge, code_challenge_method, used, expires_at, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, false, $9, now())
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(client_id)
        .bind(user_id)
        .bind(redirect_uri)
        .bind(scope)
        .bind(state)
        .bind(code_challenge)
        .bind(code_challenge_method)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)
    }

    async fn get(&self, code: &str) -> DbResult<Option<AuthorizationCode>> {
        sqlx::query_as::<_, AuthorizationCode>("SELECT * FROM authorization_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)
    }

    async fn mark_used_if_unused(&self, code: &str) -> DbResult<Option<AuthorizationCode>> {
        sqlx::query_as::<_, AuthorizationCode>(
            r#"
            UPDATE authorization_codes
            SET used = true
            WHERE code = $1 AND used = false
            RETURNING *
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)
    }
}
