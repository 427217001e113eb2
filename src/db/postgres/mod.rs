pub mod apps;
pub mod codes;
pub mod tokens;
pub mod users;

pub use apps::PgAppRepo;
pub use codes::PgCodeRepo;
pub use tokens::PgTokenRepo;
pub use users::PgUserRepo;
