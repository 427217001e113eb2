use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered third-party application.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OAuthApp {
    pub id: Uuid,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret_hash: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub scopes: Vec<String>,
    pub redirect_uris: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OAuthApp {
    pub fn redirect_uri_allowed(&self, candidate: &str) -> bool {
        self.redirect_uris.iter().any(|u| u == candidate)
    }

    pub fn scope_set(&self) -> std::collections::HashSet<&str> {
        self.scopes.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOAuthApp {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub scopes: Vec<String>,
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOAuthApp {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub redirect_uris: Option<Vec<String>>,
}

/// Returned exactly once, at creation, carrying the cleartext secret.
#[derive(Debug, Serialize)]
pub struct CreatedOAuthApp {
    #[serde(flatten)]
    pub app: OAuthApp,
    pub client_secret: String,
}
