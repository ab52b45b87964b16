//! The catalog store contract.
//!
//! The catalog (games, accounts, library entries) is owned by an external
//! collaborator; this trait is the exact surface the pipeline needs from it.
//! Duplicate detection is the store's responsibility and must be atomic —
//! "create if not duplicate" is a single logical operation.

use crate::types::{Account, AccountId, AccountStatus, Game, GameId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by a catalog store implementation.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// An account with this identifier (case-insensitive) already exists for
    /// the game. Callers skip and continue; this is never a batch failure.
    #[error("duplicate account identifier '{identifier}'")]
    Duplicate {
        /// The conflicting identifier as submitted
        identifier: String,
    },

    /// The requested row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other storage failure (connection, constraint, decode).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Persistence collaborator for the acquisition and validation pipeline.
///
/// Implementations must enforce case-insensitive uniqueness of
/// `(game, identifier)` so that overlapping writers cannot race a
/// read-check-then-write duplicate past the store.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All catalogued accounts for a game.
    async fn find_accounts_by_game(&self, game_id: &GameId) -> CatalogResult<Vec<Account>>;

    /// Create a new account row, or fail with [`CatalogError::Duplicate`]
    /// when the identifier already exists for this game (case-insensitive).
    async fn create_account(
        &self,
        game_id: &GameId,
        identifier: &str,
        secret: &str,
    ) -> CatalogResult<Account>;

    /// Record the outcome of a validation check.
    async fn update_account_status(
        &self,
        account_id: &AccountId,
        status: AccountStatus,
        tested_at: DateTime<Utc>,
    ) -> CatalogResult<()>;

    /// Look up a game by name (case-insensitive), creating it when absent.
    /// The boolean is `true` when the game was created by this call.
    async fn find_or_create_game(&self, name: &str) -> CatalogResult<(Game, bool)>;
}
