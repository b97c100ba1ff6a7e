pub mod initdb;
pub mod login;
pub mod register;
pub mod users;

pub use initdb::init_database;
pub use login::login;
pub use register::{register_company, register_customer};
pub use users::{add_company_profile, delete_user, list_users, show_user};
