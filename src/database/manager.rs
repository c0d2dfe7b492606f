use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the connection pool and keeps the schema current
pub struct DatabaseManager;

impl DatabaseManager {
    /// Read DATABASE_URL; `None` when unset or set to the in-memory marker
    pub fn database_url() -> Option<String> {
        std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty() && !Self::is_memory_url(url))
    }

    pub fn is_memory_url(url: &str) -> bool {
        url.trim() == "memory:"
    }

    /// Open a pool sized from config
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let redacted = Self::redact(database_url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(database_url)
            .await?;

        info!("Created database pool for: {}", redacted);
        Ok(pool)
    }

    /// Connect using DATABASE_URL from the environment
    pub async fn connect_from_env(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = Self::database_url().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        Self::connect(&url, config).await
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        MIGRATOR.run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Strip the password from a connection URL so it can be logged
    pub fn redact(database_url: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
