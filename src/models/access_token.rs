use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Audit/revocation index for an emitted JWT. The JWT itself is
/// self-describing; this record exists only to support introspection
/// and revocation without persisting raw token bytes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessTokenRecord {
    pub token_hash: String,
    pub jti: Uuid,
    pub client_id: String,
    pub user_id: Option<Uuid>,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl AccessTokenRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }

    pub fn scopes(&self) -> Vec<&str> {
        self.scope.split(' ').filter(|s| !s.is_empty()).collect()
    }
}
