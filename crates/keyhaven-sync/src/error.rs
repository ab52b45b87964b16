use thiserror::Error;

/// Errors surfaced by the sync controller.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A sync is already running under this job key. Surfaced immediately
    /// to the caller; requests are never queued or coalesced.
    #[error("a sync is already running for job key '{job_key}'")]
    AlreadyRunning {
        /// The conflicting job key
        job_key: String,
    },

    /// Non-recoverable controller failure (the catalog store went away at
    /// the game level). Per-target harvest failures are tolerated and never
    /// produce this.
    #[error("sync failed: {0}")]
    Fatal(String),
}
