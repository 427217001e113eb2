pub mod app_service;
pub mod authz_code_service;
pub mod token_service;
pub mod user_service;

pub use app_service::AppService;
pub use authz_code_service::{AuthzCodeService, CreateCodeError, ExchangeError};
pub use token_service::{IntrospectionResult, TokenService};
pub use user_service::UserService;
