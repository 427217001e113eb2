//! End-to-end exercises of the service layer against in-memory fake
//! repositories, covering the protocol invariants the OAuth/OIDC
//! grant and revocation flows depend on.

mod common;

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use common::{FakeAppRepo, FakeCodeRepo, FakeTokenRepo, FakeUserRepo};
use ns_auth::auth::hashing;
use ns_auth::auth::keys::KeyManager;
use ns_auth::models::User;
use ns_auth::services::{AuthzCodeService, TokenService};
use ns_auth::validation;

fn test_keys() -> Arc<KeyManager> {
    let dir = std::env::temp_dir().join(format!("ns-auth-protocol-test-{}", Uuid::new_v4()));
    Arc::new(KeyManager::load_or_generate(None, None, dir.to_str().unwrap()).expect("keygen"))
}

async fn make_app(apps: &FakeAppRepo, scopes: &[&str], redirects: &[&str]) -> ns_auth::models::OAuthApp {
    let client_id = hashing::generate_client_id();
    let secret = hashing::generate_client_secret();
    let hash = hashing::hash_client_secret(&secret).unwrap();
    apps.create(
        &client_id,
        &hash,
        "Test App",
        None,
        None,
        None,
        &scopes.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        &redirects.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn client_credentials_round_trip_then_revoke() {
    use ns_auth::db::AppRepo;

    let apps = Arc::new(FakeAppRepo::new());
    let tokens_repo = Arc::new(FakeTokenRepo::new());
    let keys = test_keys();

    let app = make_app(&apps, &["openid", "email"], &[]).await;
    let token_service = TokenService::new(apps.clone(), tokens_repo.clone(), keys, "https://issuer.example".into(), 3600);

    let granted = validation::narrow_scopes(&app, "email");
    let minted = token_service.issue_client_credentials(&app, granted).await.unwrap();
    assert_eq!(minted.scope, "email");
    assert_eq!(minted.expires_in, 3600);

    let introspection = token_service.introspect(&minted.token).await;
    let json = serde_json::to_value(&introspection).unwrap();
    assert_eq!(json["active"], json!(true));
    assert_eq!(json["scope"], json!("email"));
    assert_eq!(json["client_id"], json!(app.client_id));

    token_service.revoke(&minted.token).await;
    let after_revoke = token_service.introspect(&minted.token).await;
    let json = serde_json::to_value(&after_revoke).unwrap();
    assert_eq!(json, json!({"active": false}));
}

#[tokio::test]
async fn empty_requested_scope_grants_full_app_scope_set() {
    let apps = Arc::new(FakeAppRepo::new());
    let app = make_app(&apps, &["openid", "email", "profile"], &[]).await;

    let granted = validation::narrow_scopes(&app, "");
    assert_eq!(granted.len(), 3);

    let granted = validation::narrow_scopes(&app, "email");
    assert_eq!(granted, vec!["email".to_string()]);

    // requesting a scope the app doesn't have grants nothing extra
    let granted = validation::narrow_scopes(&app, "superadmin");
    assert!(granted.is_empty());
}

#[tokio::test]
async fn authorization_code_pkce_round_trip_and_single_use() {
    let apps = Arc::new(FakeAppRepo::new());
    let codes_repo = Arc::new(FakeCodeRepo::new());
    let app = make_app(&apps, &["openid", "profile"], &["https://app.example/cb"]).await;
    let user_id = Uuid::new_v4();

    let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());
    assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");

    let code_service = AuthzCodeService::new(codes_repo, 600);
    let code = code_service
        .create(
            &app.client_id,
            user_id,
            "https://app.example/cb",
            "openid profile",
            Some("xyz"),
            Some(&challenge),
            Some("S256"),
        )
        .await
        .unwrap();

    // wrong verifier fails, code is NOT consumed
    let wrong = code_service
        .exchange(&code, &app.client_id, "https://app.example/cb", Some("wrong-verifier"))
        .await;
    assert!(wrong.is_err());

    // correct verifier still works afterward
    let record = code_service
        .exchange(&code, &app.client_id, "https://app.example/cb", Some(verifier))
        .await
        .expect("first redemption with the right verifier must succeed");
    assert_eq!(record.user_id, user_id);
    assert_eq!(record.scope, "openid profile");

    // second attempt with the same code, now consumed, always fails
    let second = code_service
        .exchange(&code, &app.client_id, "https://app.example/cb", Some(verifier))
        .await;
    assert!(second.is_err());
}

#[tokio::test]
async fn redirect_uri_mismatch_is_rejected_exactly() {
    let apps = Arc::new(FakeAppRepo::new());
    let codes_repo = Arc::new(FakeCodeRepo::new());
    let app = make_app(&apps, &["openid"], &["https://app.example/cb"]).await;
    let user_id = Uuid::new_v4();

    let code_service = AuthzCodeService::new(codes_repo, 600);
    let code = code_service
        .create(&app.client_id, user_id, "https://app.example/cb", "openid", None, None, None)
        .await
        .unwrap();

    // trailing slash must not match
    let result = code_service
        .exchange(&code, &app.client_id, "https://app.example/cb/", None)
        .await;
    assert!(result.is_err());

    // exact match still works
    let result = code_service
        .exchange(&code, &app.client_id, "https://app.example/cb", None)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let apps = Arc::new(FakeAppRepo::new());
    let codes_repo = Arc::new(FakeCodeRepo::new());
    let app = make_app(&apps, &["openid"], &["https://app.example/cb"]).await;
    let user_id = Uuid::new_v4();

    // an expiry of 0 seconds means "already expired" by the time exchange runs
    let code_service = AuthzCodeService::new(codes_repo, 0);
    let code = code_service
        .create(&app.client_id, user_id, "https://app.example/cb", "openid", None, None, None)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let result = code_service
        .exchange(&code, &app.client_id, "https://app.example/cb", None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn create_rejects_unsupported_challenge_method() {
    let apps = Arc::new(FakeAppRepo::new());
    let codes_repo = Arc::new(FakeCodeRepo::new());
    let app = make_app(&apps, &["openid"], &["https://app.example/cb"]).await;
    let user_id = Uuid::new_v4();

    let code_service = AuthzCodeService::new(codes_repo, 600);
    let result = code_service
        .create(
            &app.client_id,
            user_id,
            "https://app.example/cb",
            "openid",
            None,
            Some("not-a-real-challenge"),
            Some("md5"),
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn concurrent_code_exchange_has_exactly_one_winner() {
    let apps = Arc::new(FakeAppRepo::new());
    let codes_repo = Arc::new(FakeCodeRepo::new());
    let app = make_app(&apps, &["openid"], &["https://app.example/cb"]).await;
    let user_id = Uuid::new_v4();

    let code_service = Arc::new(AuthzCodeService::new(codes_repo, 600));
    let code = code_service
        .create(&app.client_id, user_id, "https://app.example/cb", "openid", None, None, None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let svc = code_service.clone();
        let code = code.clone();
        let client_id = app.client_id.clone();
        handles.push(tokio::spawn(async move {
            svc.exchange(&code, &client_id, "https://app.example/cb", None).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1, "exactly one concurrent redemption should succeed");
}

#[tokio::test]
async fn revoked_token_loses_user_context_for_userinfo_style_lookup() {
    use ns_auth::db::UserRepo;

    let apps = Arc::new(FakeAppRepo::new());
    let tokens_repo = Arc::new(FakeTokenRepo::new());
    let users_repo = Arc::new(FakeUserRepo::new());
    let keys = test_keys();

    let app = make_app(&apps, &["openid", "email"], &["https://app.example/cb"]).await;
    let user = User {
        id: Uuid::new_v4(),
        broker_did: Some("did:example:123".into()),
        email: Some("person@example.com".into()),
        display_name: Some("Person".into()),
        avatar_url: None,
        cohort: None,
        bio: None,
        socials: json!({}),
        wallet_address: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };
    users_repo.insert(user.clone());

    let token_service = TokenService::new(apps, tokens_repo, keys, "https://issuer.example".into(), 3600);
    let minted = token_service
        .issue_user_token(&app, user.id, vec!["openid".into(), "email".into()])
        .await
        .unwrap();

    let active = token_service.active_record(&minted.token).await;
    assert!(active.is_some());
    assert_eq!(users_repo.get_by_id(user.id).await.unwrap().unwrap().id, user.id);

    token_service.revoke(&minted.token).await;
    let after_revoke = token_service.active_record(&minted.token).await;
    assert!(after_revoke.is_none());
}
