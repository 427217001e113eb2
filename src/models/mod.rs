pub mod access_token;
pub mod authorization_code;
pub mod oauth_app;
pub mod session;
pub mod user;

pub use access_token::AccessTokenRecord;
pub use authorization_code::AuthorizationCode;
pub use oauth_app::OAuthApp;
pub use session::SessionClaims;
pub use user::User;
