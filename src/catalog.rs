//! Static scope catalog. Changes to what scopes exist are code-level,
//! not data-level — there is no admin mutation surface for this table.

pub struct ScopeDef {
    pub name: &'static str,
    pub description: &'static str,
    pub claims: &'static [&'static str],
}

pub const SCOPES: &[ScopeDef] = &[
    ScopeDef {
        name: "openid",
        description: "Authenticate and receive an ID token",
        claims: &["sub"],
    },
    ScopeDef {
        name: "profile",
        description: "Display name and avatar",
        claims: &["name", "picture", "bio"],
    },
    ScopeDef {
        name: "email",
        description: "Email address",
        claims: &["email", "email_verified"],
    },
    ScopeDef {
        name: "cohort",
        description: "Cohort membership",
        claims: &["cohort"],
    },
    ScopeDef {
        name: "activity",
        description: "Activity statistics",
        claims: &["posts_count", "streak_days", "last_active"],
    },
    ScopeDef {
        name: "socials",
        description: "Linked social accounts",
        claims: &["socials"],
    },
    ScopeDef {
        name: "wallet",
        description: "Wallet address",
        claims: &["wallet_address"],
    },
    ScopeDef {
        name: "offline_access",
        description: "Long-lived access (advertised, not yet issued)",
        claims: &[],
    },
];

pub fn all_scope_names() -> Vec<&'static str> {
    SCOPES.iter().map(|s| s.name).collect()
}

pub fn is_known(name: &str) -> bool {
    SCOPES.iter().any(|s| s.name == name)
}

pub fn find(name: &str) -> Option<&'static ScopeDef> {
    SCOPES.iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_discovery_set() {
        let names: std::collections::HashSet<_> = all_scope_names().into_iter().collect();
        let expected: std::collections::HashSet<_> = [
            "openid",
            "profile",
            "email",
            "cohort",
            "activity",
            "socials",
            "wallet",
            "offline_access",
        ]
        .into_iter()
        .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn unknown_scope_is_rejected() {
        assert!(!is_known("superadmin"));
    }
}
