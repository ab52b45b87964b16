//! Sync job state and polling snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Lifecycle state of a sync job.
///
/// `Idle` is also the terminal display state after the retention window
/// expires on a finished job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// No job known under this key
    #[default]
    Idle,
    /// A worker is processing targets
    Running,
    /// All targets processed
    Completed,
    /// The controller hit a non-recoverable error
    Failed,
}

impl SyncStatus {
    /// Stable string form used for storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    /// Whether the job has reached a final state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scope of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Refresh the whole catalog
    Full,
    /// Refresh a single target
    Single,
}

impl SyncMode {
    /// Stable string form used for storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Single => "single",
        }
    }
}

/// Mutable progress record for one job key.
///
/// Owned by the controller's registry; written only by the single worker
/// task for its key, read by pollers through [`SyncSnapshot`] copies.
#[derive(Debug, Clone)]
pub struct SyncJob {
    /// Key this job runs under
    pub job_key: String,
    /// Scope of the run
    pub mode: SyncMode,
    /// Current lifecycle state
    pub status: SyncStatus,
    /// Number of targets scheduled
    pub targets_total: u32,
    /// Number of targets finished (success or empty alike)
    pub targets_processed: u32,
    /// Accounts created during this run
    pub accounts_added: u32,
    /// Games created during this run
    pub games_added: u32,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished, once terminal
    pub finished_at: Option<DateTime<Utc>>,
    /// Most-recent-first names of games that gained their first credentials
    /// in this run, bounded by the configured limit
    pub recently_added_games: VecDeque<String>,
    /// Failure message, set when `status` is `Failed`
    pub error: Option<String>,
}

impl SyncJob {
    /// Create a fresh `Running` job.
    #[must_use]
    pub fn new(job_key: impl Into<String>, mode: SyncMode, targets_total: u32) -> Self {
        Self {
            job_key: job_key.into(),
            mode,
            status: SyncStatus::Running,
            targets_total,
            targets_processed: 0,
            accounts_added: 0,
            games_added: 0,
            started_at: Utc::now(),
            finished_at: None,
            recently_added_games: VecDeque::new(),
            error: None,
        }
    }

    /// Targets still to be processed.
    #[must_use]
    pub fn targets_remaining(&self) -> u32 {
        self.targets_total.saturating_sub(self.targets_processed)
    }

    /// Record a newly credentialed game, most recent first, bounded.
    pub fn push_recent_game(&mut self, name: impl Into<String>, limit: usize) {
        self.recently_added_games.push_front(name.into());
        self.recently_added_games.truncate(limit);
    }

    /// Transition to `Completed`. Happens exactly once per job.
    pub fn complete(&mut self) {
        self.status = SyncStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Transition to `Failed`, retaining partial counters as-is.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = SyncStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error.into());
    }

    /// Progress percentage. Forced to exactly 100 once `Completed`, even
    /// when timing math would suggest 99.x.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.status == SyncStatus::Completed {
            return 100.0;
        }
        if self.targets_total == 0 {
            return 0.0;
        }
        f64::from(self.targets_processed) * 100.0 / f64::from(self.targets_total)
    }
}

/// Read-only copy handed to polling clients.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSnapshot {
    /// Current lifecycle state
    pub status: SyncStatus,
    /// Scope of the run, absent when idle
    pub mode: Option<SyncMode>,
    /// Number of targets scheduled
    pub targets_total: u32,
    /// Number of targets finished
    pub targets_processed: u32,
    /// Targets still to be processed
    pub targets_remaining: u32,
    /// Accounts created during this run
    pub accounts_added: u32,
    /// Games created during this run
    pub games_added: u32,
    /// Progress percentage (exactly 100 once completed)
    pub percent: f64,
    /// When the run started
    pub started_at: Option<DateTime<Utc>>,
    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,
    /// Most-recent-first names of games that gained their first credentials
    pub recently_added_games: Vec<String>,
    /// Failure message, when failed
    pub error: Option<String>,
}

impl SyncSnapshot {
    /// The snapshot shown when nothing is known for a key.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            status: SyncStatus::Idle,
            mode: None,
            targets_total: 0,
            targets_processed: 0,
            targets_remaining: 0,
            accounts_added: 0,
            games_added: 0,
            percent: 0.0,
            started_at: None,
            finished_at: None,
            recently_added_games: Vec::new(),
            error: None,
        }
    }
}

impl From<&SyncJob> for SyncSnapshot {
    fn from(job: &SyncJob) -> Self {
        Self {
            status: job.status,
            mode: Some(job.mode),
            targets_total: job.targets_total,
            targets_processed: job.targets_processed,
            targets_remaining: job.targets_remaining(),
            accounts_added: job.accounts_added,
            games_added: job.games_added,
            percent: job.percent(),
            started_at: Some(job.started_at),
            finished_at: job.finished_at,
            recently_added_games: job.recently_added_games.iter().cloned().collect(),
            error: job.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_running() {
        let job = SyncJob::new("global", SyncMode::Full, 5);
        assert_eq!(job.status, SyncStatus::Running);
        assert_eq!(job.targets_total, 5);
        assert_eq!(job.targets_remaining(), 5);
        assert!(job.finished_at.is_none());
    }

    #[test]
    fn test_percent_tracks_progress() {
        let mut job = SyncJob::new("global", SyncMode::Full, 4);
        assert!((job.percent() - 0.0).abs() < f64::EPSILON);
        job.targets_processed = 1;
        assert!((job.percent() - 25.0).abs() < f64::EPSILON);
        job.targets_processed = 3;
        assert!((job.percent() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completed_percent_is_exactly_100() {
        // Even with odd counts that would divide to 99.x, completion pins
        // the displayed percentage.
        let mut job = SyncJob::new("global", SyncMode::Full, 3);
        job.targets_processed = 3;
        job.complete();
        assert!((job.percent() - 100.0).abs() < f64::EPSILON);
        assert_eq!(job.status, SyncStatus::Completed);
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn test_zero_target_job_percent() {
        let mut job = SyncJob::new("global", SyncMode::Full, 0);
        assert!((job.percent() - 0.0).abs() < f64::EPSILON);
        job.complete();
        assert!((job.percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recent_games_bounded_most_recent_first() {
        let mut job = SyncJob::new("global", SyncMode::Full, 10);
        for name in ["first", "second", "third", "fourth"] {
            job.push_recent_game(name, 3);
        }
        let names: Vec<_> = job.recently_added_games.iter().cloned().collect();
        assert_eq!(names, vec!["fourth", "third", "second"]);
    }

    #[test]
    fn test_fail_retains_partial_counters() {
        let mut job = SyncJob::new("global", SyncMode::Full, 5);
        job.targets_processed = 2;
        job.accounts_added = 7;
        job.fail("store went away");
        assert_eq!(job.status, SyncStatus::Failed);
        assert_eq!(job.targets_processed, 2);
        assert_eq!(job.accounts_added, 7);
        assert_eq!(job.error.as_deref(), Some("store went away"));
    }

    #[test]
    fn test_snapshot_copies_job_fields() {
        let mut job = SyncJob::new("global", SyncMode::Single, 2);
        job.targets_processed = 1;
        job.accounts_added = 3;
        job.push_recent_game("Star Drift", 10);

        let snapshot = SyncSnapshot::from(&job);
        assert_eq!(snapshot.status, SyncStatus::Running);
        assert_eq!(snapshot.targets_remaining, 1);
        assert_eq!(snapshot.accounts_added, 3);
        assert_eq!(snapshot.recently_added_games, vec!["Star Drift"]);
        assert!((snapshot.percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_idle_snapshot() {
        let snapshot = SyncSnapshot::idle();
        assert_eq!(snapshot.status, SyncStatus::Idle);
        assert!(snapshot.mode.is_none());
        assert!((snapshot.percent - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!SyncStatus::Idle.is_terminal());
        assert!(!SyncStatus::Running.is_terminal());
        assert!(SyncStatus::Completed.is_terminal());
        assert!(SyncStatus::Failed.is_terminal());
    }
}
