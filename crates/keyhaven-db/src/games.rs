//! Game row operations.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use keyhaven_core::{Game, GameId};
use sqlx::{Pool, Row, Sqlite};

fn row_to_game(row: &sqlx::sqlite::SqliteRow) -> Result<Game> {
    let id: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Game {
        id: GameId::new(id).map_err(|e| DatabaseError::Decode(e.to_string()))?,
        name,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| DatabaseError::Decode(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc),
    })
}

/// Look up a game by name (case-insensitive), creating it when absent.
/// The boolean is `true` when this call created the row.
///
/// A concurrent insert of the same name loses to the unique index and falls
/// back to the read, so callers never see a spurious duplicate error.
pub async fn find_or_create_game(pool: &Pool<Sqlite>, name: &str) -> Result<(Game, bool)> {
    if let Some(row) = sqlx::query("SELECT id, name, created_at FROM games WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?
    {
        return Ok((row_to_game(&row)?, false));
    }

    let id = GameId::generate();
    let created_at = Utc::now();
    let inserted = sqlx::query("INSERT INTO games (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id.as_str())
        .bind(name)
        .bind(created_at.to_rfc3339())
        .execute(pool)
        .await;

    match inserted {
        Ok(_) => Ok((
            Game {
                id,
                name: name.to_string(),
                created_at,
            },
            true,
        )),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let row = sqlx::query("SELECT id, name, created_at FROM games WHERE name = ?")
                .bind(name)
                .fetch_one(pool)
                .await?;
            Ok((row_to_game(&row)?, false))
        }
        Err(err) => Err(err.into()),
    }
}

/// Look up a game by name (case-insensitive) without creating it.
pub async fn find_game(pool: &Pool<Sqlite>, name: &str) -> Result<Option<Game>> {
    let row = sqlx::query("SELECT id, name, created_at FROM games WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_game).transpose()
}

/// All games, ordered by name.
pub async fn list_games(pool: &Pool<Sqlite>) -> Result<Vec<Game>> {
    let rows = sqlx::query("SELECT id, name, created_at FROM games ORDER BY name")
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_game).collect()
}
