//! Shared fixtures for the crate's tests.

use migration::{Migrator, MigratorTrait};
use model::entities::user;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use crate::password::hash_password;
use crate::store::{AccountStore, NewUser};

pub const PASSWORD: &str = "Str0ngP@ss!";

async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None).await.expect("Migrations failed.");
    db
}

/// A store over a fresh, migrated in-memory database.
pub async fn setup_store() -> AccountStore {
    AccountStore::new(setup_db().await)
}

/// Inserts a plain active user whose password is [`PASSWORD`].
pub async fn insert_user(store: &AccountStore, username: &str, email: &str) -> user::Model {
    AccountStore::insert_user(
        store.connection(),
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).expect("Failed to hash password"),
            is_customer: false,
            is_company: false,
        },
    )
    .await
    .expect("Failed to insert user")
}
