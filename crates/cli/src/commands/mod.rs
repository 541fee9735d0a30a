//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use bazaar_api::db::RepositoryError;
use bazaar_api::services::auth::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// A command-line argument is unusable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Seed file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Seed file is not valid YAML for the expected shape.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Seed file parsed but an entry is unusable.
    #[error("Invalid product #{index}: {reason}")]
    InvalidProduct { index: usize, reason: String },
}

/// Read the database URL, preferring `BAZAAR_DATABASE_URL`.
fn database_url() -> Result<SecretString, CommandError> {
    std::env::var("BAZAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("BAZAAR_DATABASE_URL"))
}

/// Connect to the shop database.
async fn connect() -> Result<PgPool, CommandError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(url.expose_secret()).await?)
}
