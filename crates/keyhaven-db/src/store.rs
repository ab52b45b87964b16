//! `CatalogStore` implementation over the SQLite layer.

use crate::error::DatabaseError;
use crate::{accounts, games, Database};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyhaven_core::{
    Account, AccountId, AccountStatus, CatalogError, CatalogResult, CatalogStore, Game, GameId,
};

fn storage_err(err: DatabaseError) -> CatalogError {
    CatalogError::Storage(err.to_string())
}

#[async_trait]
impl CatalogStore for Database {
    async fn find_accounts_by_game(&self, game_id: &GameId) -> CatalogResult<Vec<Account>> {
        accounts::find_accounts_by_game(self.pool(), game_id)
            .await
            .map_err(storage_err)
    }

    async fn create_account(
        &self,
        game_id: &GameId,
        identifier: &str,
        secret: &str,
    ) -> CatalogResult<Account> {
        match accounts::create_account(self.pool(), game_id, identifier, secret).await {
            Ok(account) => Ok(account),
            Err(DatabaseError::Sqlx(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                Err(CatalogError::Duplicate {
                    identifier: identifier.to_string(),
                })
            }
            Err(err) => Err(storage_err(err)),
        }
    }

    async fn update_account_status(
        &self,
        account_id: &AccountId,
        status: AccountStatus,
        tested_at: DateTime<Utc>,
    ) -> CatalogResult<()> {
        match accounts::update_account_status(self.pool(), account_id, status, tested_at).await {
            Ok(()) => Ok(()),
            Err(DatabaseError::NotFoundWithMessage(msg)) => Err(CatalogError::NotFound(msg)),
            Err(err) => Err(storage_err(err)),
        }
    }

    async fn find_or_create_game(&self, name: &str) -> CatalogResult<(Game, bool)> {
        games::find_or_create_game(self.pool(), name)
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_store() -> Database {
        let db = Database::new(":memory:").await.expect("create test database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    #[tokio::test]
    async fn test_trait_round_trip() {
        let db = setup_test_store().await;
        let store: &dyn CatalogStore = &db;

        let (game, created) = store
            .find_or_create_game("Star Drift")
            .await
            .expect("create game");
        assert!(created);

        let account = store
            .create_account(&game.id, "keeper77", "pw-x1!aa")
            .await
            .expect("create account");

        store
            .update_account_status(&account.id, AccountStatus::Valid, Utc::now())
            .await
            .expect("update status");

        let accounts = store
            .find_accounts_by_game(&game.id)
            .await
            .expect("find accounts");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].status, AccountStatus::Valid);
    }

    #[tokio::test]
    async fn test_duplicate_maps_to_catalog_error() {
        let db = setup_test_store().await;
        let store: &dyn CatalogStore = &db;

        let (game, _) = store
            .find_or_create_game("Star Drift")
            .await
            .expect("create game");
        store
            .create_account(&game.id, "keeper77", "pw-x1!aa")
            .await
            .expect("create account");

        let duplicate = store.create_account(&game.id, "Keeper77", "other-pw").await;
        assert!(matches!(
            duplicate,
            Err(CatalogError::Duplicate { ref identifier }) if identifier.as_str() == "Keeper77"
        ));
    }

    #[tokio::test]
    async fn test_missing_account_maps_to_not_found() {
        let db = setup_test_store().await;
        let store: &dyn CatalogStore = &db;

        let result = store
            .update_account_status(&AccountId::generate(), AccountStatus::Valid, Utc::now())
            .await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}
