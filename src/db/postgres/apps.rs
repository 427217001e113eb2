use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::{DbError, DbResult};
use crate::db::repos::AppRepo;
use crate::models::OAuthApp;

pub struct PgAppRepo {
    pool: PgPool,
}

impl PgAppRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppRepo for PgAppRepo {
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
        sqlx::query_as::<_, OAuthApp>(
            r#"
            INSERT INTO oauth_apps
                (id, client_id, client_secret_hash, name, description, icon_url,
                 privacy_policy_url, scopes, redirect_uris, created_at, updated_at)
            VALUES
                (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, now(), now())
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(client_secret_hash)
        .bind(name)
        .bind(description)
        .bind(icon_url)
        .bind(privacy_policy_url)
        .bind(scopes)
        .bind(redirect_uris)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict("client_id already exists".to_string())
            }
            _ => DbError::Sqlx(e),
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<OAuthApp>> {
        sqlx::query_as::<_, OAuthApp>("SELECT * FROM oauth_apps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)
    }

    async fn get_by_client_id(&self, client_id: &str) -> DbResult<Option<OAuthApp>> {
        sqlx::query_as::<_, OAuthApp>("SELECT * FROM oauth_apps WHERE client_id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)
    }

    async fn list(&self) -> DbResult<Vec<OAuthApp>> {
        sqlx::query_as::<_, OAuthApp>("SELECT * FROM oauth_apps ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)
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
        sqlx::query_as::<_, OAuthApp>(
            r#"
            UPDATE oauth_apps SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                icon_url = COALESCE($4, icon_url),
                privacy_policy_url = COALESCE($5, privacy_policy_url),
                scopes = COALESCE($6, scopes),
                redirect_uris = COALESCE($7, redirect_uris),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(icon_url)
        .bind(privacy_policy_url)
        .bind(scopes)
        .bind(redirect_uris)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM oauth_apps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
