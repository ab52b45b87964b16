//! Keyhaven Database Layer
//!
//! Provides `SQLite` access for the credential catalog. Uses `SQLx` with
//! embedded, versioned migrations and implements the core `CatalogStore`
//! trait, so the rest of the pipeline only ever sees the trait.
//!
//! # Architecture
//!
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//! - **Connection Pooling**: Configurable connection pool (default: 5)
//! - **Uniqueness**: case-insensitive duplicate detection lives in the
//!   schema (`COLLATE NOCASE` unique indexes), making "create if not
//!   duplicate" a single atomic operation
//!
//! # Example
//!
//! ```ignore
//! use keyhaven_db::Database;
//!
//! let db = Database::new("keyhaven.db").await?;
//! db.run_migrations().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod accounts;
pub mod error;
pub mod games;
pub mod migrations;
pub mod store;
pub mod sync_runs;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use sync_runs::SyncRun;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// High-level database interface with migrations.
#[derive(Debug)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection pool.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or_else(|| DatabaseError::Open("invalid database path: not valid UTF-8".to_string()))?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

        tracing::info!("Database pool created at {}", path_str);

        Ok(Self { pool })
    }

    /// Create a database instance from an existing pool.
    #[must_use]
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run all pending database migrations.
    ///
    /// Call after creating a new database instance to bring the schema up
    /// to date.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    ///
    /// Returns the number of applied migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    ///
    /// This allows direct access to the `SQLx` pool for custom queries.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
