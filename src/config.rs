use accounts::{AccountStore, PasswordPolicy, PasswordPolicyConfig};
use anyhow::Result;
use config::{Config, Environment, File};
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://homeservices.db?mode=rwc";

/// Application configuration.
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `homeservices.{toml,yaml,json}` file in the working directory, then
/// `HOMESERVICES__*` environment variables
/// (e.g. `HOMESERVICES__PASSWORD_POLICY__MIN_LENGTH=12`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default)]
    pub password_policy: PasswordPolicyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load configuration
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .add_source(File::with_name("homeservices").required(false))
            .add_source(
                Environment::with_prefix("HOMESERVICES")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Application state shared across commands
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: AccountStore,
    pub policy: Arc<PasswordPolicy>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            store: AccountStore::new(db),
            policy: Arc::new(PasswordPolicy::from_config(&config.password_policy)),
        }
    }
}

/// Connect to the database. SQLite connections get foreign key enforcement
/// switched on, which the role-record cascades depend on.
pub async fn connect_database(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    if db.get_database_backend() == DatabaseBackend::Sqlite {
        debug!("Enabling SQLite foreign keys");
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    }
    Ok(db)
}

/// Initialize application state against the given database
pub async fn initialize_app_state_with_url(database_url: &str, config: &AppConfig) -> Result<AppState> {
    let db = connect_database(database_url).await?;
    Ok(AppState::new(db, config))
}
