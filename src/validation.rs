//! Small validation helpers shared across the OAuth endpoints. Exact,
//! byte-for-byte matching is the rule for redirect URIs — trailing
//! slash, case, and query string all matter.

use std::collections::HashSet;

use crate::models::OAuthApp;

pub fn redirect_uri_matches(app: &OAuthApp, candidate: &str) -> bool {
    app.redirect_uri_allowed(candidate)
}

/// Narrows `requested` (space-joined scope string, possibly empty) down
/// to the subset the app is actually permitted. Empty request grants
/// the app's full scope set, per the token-issuance rule.
pub fn narrow_scopes(app: &OAuthApp, requested: &str) -> Vec<String> {
    let requested: Vec<&str> = requested.split(' ').filter(|s| !s.is_empty()).collect();
    if requested.is_empty() {
        return app.scopes.clone();
    }
    let allowed: HashSet<&str> = app.scope_set();
    requested
        .into_iter()
        .filter(|s| allowed.contains(s))
        .map(str::to_string)
        .collect()
}

pub fn join_scopes(scopes: &[String]) -> String {
    scopes.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_app(scopes: &[&str], redirects: &[&str]) -> OAuthApp {
        OAuthApp {
            id: Uuid::new_v4(),
            client_id: "abc123".into(),
            client_secret_hash: "x".into(),
            name: "Test".into(),
            description: None,
            icon_url: None,
            privacy_policy_url: None,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            redirect_uris: redirects.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_request_grants_full_scope_set() {
        let app = test_app(&["openid", "email"], &[]);
        let granted = narrow_scopes(&app, "");
        assert_eq!(granted.len(), 2);
    }

    #[test]
    fn requested_scopes_are_intersected() {
        let app = test_app(&["openid", "email"], &[]);
        let granted = narrow_scopes(&app, "email profile");
        assert_eq!(granted, vec!["email".to_string()]);
    }

    #[test]
    fn redirect_uri_exact_match_rejects_trailing_slash() {
        let app = test_app(&[], &["https://app.example/cb"]);
        assert!(redirect_uri_matches(&app, "https://app.example/cb"));
        assert!(!redirect_uri_matches(&app, "https://app.example/cb/"));
    }
}
