pub mod error;
pub mod postgres;
pub mod repos;

pub use error::{DbError, DbResult};
pub use repos::{AppRepo, CodeRepo, TokenRepo, UserRepo};

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Holds the connection pool plus repository trait objects, built once
/// at startup and cloned (cheaply, via `Arc`) into the Axum state.
#[derive(Clone)]
pub struct DbPool {
    pool: PgPool,
    apps: Arc<dyn AppRepo>,
    users: Arc<dyn UserRepo>,
    codes: Arc<dyn CodeRepo>,
    tokens: Arc<dyn TokenRepo>,
}

impl DbPool {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        Ok(Self {
            apps: Arc::new(postgres::PgAppRepo::new(pool.clone())),
            users: Arc::new(postgres::PgUserRepo::new(pool.clone())),
            codes: Arc::new(postgres::PgCodeRepo::new(pool.clone())),
            tokens: Arc::new(postgres::PgTokenRepo::new(pool.clone())),
            pool,
        })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub fn apps(&self) -> &Arc<dyn AppRepo> {
        &self.apps
    }

    pub fn users(&self) -> &Arc<dyn UserRepo> {
        &self.users
    }

    pub fn codes(&self) -> &Arc<dyn CodeRepo> {
        &self.codes
    }

    pub fn tokens(&self) -> &Arc<dyn TokenRepo> {
        &self.tokens
    }
}
