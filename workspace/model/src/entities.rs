//! This file serves as the root for all SeaORM entity modules.
//! A user is the identity record; customers and companies are role records
//! that share the user's primary key and disappear with it.

pub mod company;
pub mod customer;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::company::Entity as Company;
    pub use super::company::ServiceCategory;
    pub use super::customer::Entity as Customer;
    pub use super::user::Entity as User;
}
