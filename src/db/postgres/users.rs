use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::{DbError, DbResult};
use crate::db::repos::UserRepo;
use crate::models::User;

pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)
    }

    async fn get_by_broker_did(&self, broker_did: &str) -> DbResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE broker_did = $1")
            .bind(broker_did)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)
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
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (id, broker_did, email, display_name, avatar_url, cohort, bio,
                 socials, wallet_address, created_at, updated_at)
            VALUES
                (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, now(), now())
            RETURNING *
            "#,
        )
        .bind(broker_did)
        .bind(email)
        .bind(display_name)
        .bind(avatar_url)
        .bind(cohort)
        .bind(bio)
        .bind(socials)
        .bind(wallet_address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict("user already exists".to_string())
            }
            _ => DbError::Sqlx(e),
        })
    }
}
