use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::StorageConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the Postgres pool handed to the table stores.
///
/// The pool is created once at startup and injected; nothing here is global.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect a pool from `DATABASE_URL`
    pub async fn connect(config: &StorageConfig) -> Result<PgPool, DatabaseError> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url.as_str())
            .await?;

        info!(
            "Created database pool for {}{} (max {} connections)",
            url.host_str().unwrap_or("localhost"),
            url.path(),
            config.max_connections
        );
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Validate table names. Accepts `[a-zA-Z_][a-zA-Z0-9_]*`, optionally
    /// schema-qualified once (`public.profiles`).
    pub fn is_valid_table_name(name: &str) -> bool {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.is_empty() || parts.len() > 2 {
            return false;
        }
        parts.iter().all(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                }
                _ => false,
            }
        })
    }

    /// Validated and quoted form of a possibly schema-qualified table name
    pub fn qualified_table(name: &str) -> Result<String, DatabaseError> {
        if !Self::is_valid_table_name(name) {
            return Err(DatabaseError::InvalidTableName(name.to_string()));
        }
        Ok(name
            .split('.')
            .map(Self::quote_identifier)
            .collect::<Vec<_>>()
            .join("."))
    }
}
