use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// An end-user identity, JIT-provisioned on first successful broker login.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub broker_did: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub cohort: Option<String>,
    pub bio: Option<String>,
    pub socials: JsonValue,
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields captured from the broker profile fetch, used to create or
/// refresh a user record during JIT provisioning.
#[derive(Debug, Clone, Default)]
pub struct BrokerProfile {
    pub broker_did: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub wallet_address: Option<String>,
}
