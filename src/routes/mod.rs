pub mod apps;
pub mod auth;
pub mod discovery;
pub mod health;
pub mod oauth;
pub mod scopes;
pub mod uploads;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Assembles every route group into one router. Protocol-critical
/// endpoints live under `/oauth`, mirroring the paths the discovery
/// metadata advertises; everything else is ambient (health, session,
/// app registration, icon upload).
pub fn build_router() -> Router<AppState> {
    let oauth_routes = Router::new()
        .route("/authorize", get(oauth::authorize))
        .route("/authorize/info", get(oauth::authorize_info))
        .route("/authorize/consent", post(oauth::authorize_consent))
        .route("/token", post(oauth::token))
        .route("/userinfo", get(oauth::userinfo))
        .route("/token/introspect", post(oauth::introspect))
        .route("/token/revoke", post(oauth::revoke));

    let well_known_routes = Router::new()
        .route("/jwks.json", get(discovery::jwks))
        .route(
            "/oauth-authorization-server",
            get(discovery::oauth_authorization_server),
        )
        .route("/openid-configuration", get(discovery::openid_configuration));

    let session_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout));

    let app_routes = Router::new()
        .route("/", get(apps::list_apps).post(apps::create_app))
        .route(
            "/{id}",
            get(apps::get_app).patch(apps::update_app).delete(apps::delete_app),
        );

    let api_routes = Router::new()
        .route("/scopes", get(scopes::list_scopes))
        .route("/uploads/icon", post(uploads::upload_icon))
        .nest("/auth", session_routes)
        .nest("/apps", app_routes);

    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/oauth", oauth_routes)
        .nest("/.well-known", well_known_routes)
        .nest("/api", api_routes)
}
