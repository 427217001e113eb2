pub mod apps;
pub mod codes;
pub mod tokens;
pub mod users;

pub use apps::AppRepo;
pub use codes::CodeRepo;
pub use tokens::TokenRepo;
pub use users::UserRepo;
