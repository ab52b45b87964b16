//! Account row operations.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use keyhaven_core::{Account, AccountId, AccountStatus, GameId};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
    let id: String = row.try_get("id")?;
    let game_id: String = row.try_get("game_id")?;
    let identifier: String = row.try_get("identifier")?;
    let secret: String = row.try_get("secret")?;
    let status: String = row.try_get("status")?;
    let last_tested_at: Option<String> = row.try_get("last_tested_at")?;
    let created_at: String = row.try_get("created_at")?;

    let parse_ts = |s: &str| -> Result<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(s)
            .map_err(|e| DatabaseError::Decode(format!("invalid timestamp: {e}")))?
            .with_timezone(&Utc))
    };

    Ok(Account {
        id: AccountId::new(id).map_err(|e| DatabaseError::Decode(e.to_string()))?,
        game_id: GameId::new(game_id).map_err(|e| DatabaseError::Decode(e.to_string()))?,
        identifier,
        secret,
        status: AccountStatus::from_str(&status)
            .map_err(|e| DatabaseError::Decode(e.to_string()))?,
        last_tested_at: last_tested_at.as_deref().map(parse_ts).transpose()?,
        created_at: parse_ts(&created_at)?,
    })
}

/// Create a new account row.
///
/// The unique index on `(game_id, identifier COLLATE NOCASE)` rejects
/// case-insensitive duplicates atomically; the violation surfaces as
/// `DatabaseError::Sqlx` and is mapped to a duplicate condition by the
/// catalog store layer.
pub async fn create_account(
    pool: &Pool<Sqlite>,
    game_id: &GameId,
    identifier: &str,
    secret: &str,
) -> Result<Account> {
    let id = AccountId::generate();
    let created_at = Utc::now();
    let status = AccountStatus::Unverified;

    sqlx::query(
        "INSERT INTO accounts (id, game_id, identifier, secret, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id.as_str())
    .bind(game_id.as_str())
    .bind(identifier)
    .bind(secret)
    .bind(status.as_str())
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(Account {
        id,
        game_id: game_id.clone(),
        identifier: identifier.to_string(),
        secret: secret.to_string(),
        status,
        last_tested_at: None,
        created_at,
    })
}

/// All accounts for a game, oldest first.
pub async fn find_accounts_by_game(pool: &Pool<Sqlite>, game_id: &GameId) -> Result<Vec<Account>> {
    let rows = sqlx::query(
        "SELECT id, game_id, identifier, secret, status, last_tested_at, created_at
         FROM accounts WHERE game_id = ? ORDER BY created_at",
    )
    .bind(game_id.as_str())
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_account).collect()
}

/// Record a validation outcome on an account.
pub async fn update_account_status(
    pool: &Pool<Sqlite>,
    account_id: &AccountId,
    status: AccountStatus,
    tested_at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query("UPDATE accounts SET status = ?, last_tested_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(tested_at.to_rfc3339())
        .bind(account_id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFoundWithMessage(format!(
            "account '{account_id}' not found"
        )));
    }

    Ok(())
}

/// Total number of catalogued accounts.
pub async fn count_accounts(pool: &Pool<Sqlite>) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{games, Database};

    async fn setup_test_db() -> (Database, GameId) {
        let db = Database::new(":memory:").await.expect("create test database");
        db.run_migrations().await.expect("run migrations");
        let (game, _) = games::find_or_create_game(db.pool(), "Star Drift")
            .await
            .expect("create game");
        (db, game.id)
    }

    #[tokio::test]
    async fn test_create_and_find_accounts() {
        let (db, game_id) = setup_test_db().await;

        create_account(db.pool(), &game_id, "keeper77", "pw-x1!aa")
            .await
            .expect("create account");
        create_account(db.pool(), &game_id, "nightowl42", "Rq7!mv9z")
            .await
            .expect("create account");

        let accounts = find_accounts_by_game(db.pool(), &game_id)
            .await
            .expect("find accounts");
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].identifier, "keeper77");
        assert_eq!(accounts[0].status, AccountStatus::Unverified);
        assert!(accounts[0].last_tested_at.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_identifier_rejected_case_insensitively() {
        let (db, game_id) = setup_test_db().await;

        create_account(db.pool(), &game_id, "keeper77", "pw-x1!aa")
            .await
            .expect("create account");

        let duplicate = create_account(db.pool(), &game_id, "KEEPER77", "other-pw").await;
        match duplicate {
            Err(DatabaseError::Sqlx(sqlx::Error::Database(db_err))) => {
                assert!(db_err.is_unique_violation());
            }
            other => panic!("expected unique violation, got {other:?}"),
        }

        assert_eq!(count_accounts(db.pool()).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_same_identifier_allowed_across_games() {
        let (db, game_id) = setup_test_db().await;
        let (other_game, _) = games::find_or_create_game(db.pool(), "Mole Patrol")
            .await
            .expect("create game");

        create_account(db.pool(), &game_id, "keeper77", "pw-x1!aa")
            .await
            .expect("create account");
        create_account(db.pool(), &other_game.id, "keeper77", "pw-x1!aa")
            .await
            .expect("same identifier, different game");

        assert_eq!(count_accounts(db.pool()).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn test_update_account_status() {
        let (db, game_id) = setup_test_db().await;
        let account = create_account(db.pool(), &game_id, "keeper77", "pw-x1!aa")
            .await
            .expect("create account");

        let tested_at = Utc::now();
        update_account_status(db.pool(), &account.id, AccountStatus::Valid, tested_at)
            .await
            .expect("update status");

        let accounts = find_accounts_by_game(db.pool(), &game_id)
            .await
            .expect("find accounts");
        assert_eq!(accounts[0].status, AccountStatus::Valid);
        assert_eq!(
            accounts[0].last_tested_at.expect("tested at").timestamp(),
            tested_at.timestamp()
        );
    }

    #[tokio::test]
    async fn test_update_missing_account_not_found() {
        let (db, _game_id) = setup_test_db().await;
        let result = update_account_status(
            db.pool(),
            &AccountId::generate(),
            AccountStatus::Valid,
            Utc::now(),
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::NotFoundWithMessage(_))));
    }
}
