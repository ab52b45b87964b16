//! Sync run history for tracking catalog refresh operations.

use crate::error::Result;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

/// A record of one sync run under a job key.
#[derive(Debug, Clone)]
pub struct SyncRun {
    /// Unique identifier for the run
    pub id: String,
    /// Job key the run executed under
    pub job_key: String,
    /// Sync mode ("full" or "single")
    pub mode: String,
    /// Final status ("Running", "Completed", "Failed")
    pub status: String,
    /// Number of targets scheduled
    pub targets_total: i64,
    /// Number of targets finished
    pub targets_processed: i64,
    /// Accounts created during the run
    pub accounts_added: i64,
    /// Games created during the run
    pub games_added: i64,
    /// When the run started (RFC3339 timestamp)
    pub started_at: String,
    /// When the run finished (RFC3339 timestamp)
    pub finished_at: Option<String>,
    /// Failure message, when failed
    pub error: Option<String>,
}

fn row_to_run(row: &sqlx::sqlite::SqliteRow) -> Result<SyncRun> {
    Ok(SyncRun {
        id: row.try_get("id")?,
        job_key: row.try_get("job_key")?,
        mode: row.try_get("mode")?,
        status: row.try_get("status")?,
        targets_total: row.try_get("targets_total")?,
        targets_processed: row.try_get("targets_processed")?,
        accounts_added: row.try_get("accounts_added")?,
        games_added: row.try_get("games_added")?,
        started_at: row.try_get("started_at")?,
        finished_at: row.try_get("finished_at")?,
        error: row.try_get("error")?,
    })
}

/// Create a new sync run record in the `Running` state.
pub async fn create_sync_run(
    pool: &Pool<Sqlite>,
    job_key: &str,
    mode: &str,
    targets_total: u32,
) -> Result<SyncRun> {
    let id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO sync_runs (id, job_key, mode, status, targets_total, started_at)
         VALUES (?, ?, ?, 'Running', ?, ?)",
    )
    .bind(&id)
    .bind(job_key)
    .bind(mode)
    .bind(i64::from(targets_total))
    .bind(&started_at)
    .execute(pool)
    .await?;

    Ok(SyncRun {
        id,
        job_key: job_key.to_string(),
        mode: mode.to_string(),
        status: "Running".to_string(),
        targets_total: i64::from(targets_total),
        targets_processed: 0,
        accounts_added: 0,
        games_added: 0,
        started_at,
        finished_at: None,
        error: None,
    })
}

/// Record the terminal state and final counters of a run.
pub async fn finish_sync_run(
    pool: &Pool<Sqlite>,
    run_id: &str,
    status: &str,
    targets_processed: u32,
    accounts_added: u32,
    games_added: u32,
    error: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "UPDATE sync_runs
         SET status = ?, targets_processed = ?, accounts_added = ?, games_added = ?,
             finished_at = ?, error = ?
         WHERE id = ?",
    )
    .bind(status)
    .bind(i64::from(targets_processed))
    .bind(i64::from(accounts_added))
    .bind(i64::from(games_added))
    .bind(Utc::now().to_rfc3339())
    .bind(error)
    .bind(run_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent run for a job key, if any.
pub async fn latest_sync_run(pool: &Pool<Sqlite>, job_key: &str) -> Result<Option<SyncRun>> {
    let row = sqlx::query(
        "SELECT id, job_key, mode, status, targets_total, targets_processed,
                accounts_added, games_added, started_at, finished_at, error
         FROM sync_runs WHERE job_key = ? ORDER BY started_at DESC LIMIT 1",
    )
    .bind(job_key)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_run).transpose()
}
