use serde::{Deserialize, Serialize};

/// Claims carried in the `ns_session` HS256 cookie. Stateless: no
/// database row backs a session, so verification is pure signature +
/// shape checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl SessionClaims {
    pub const TYPE: &'static str = "session";
}
