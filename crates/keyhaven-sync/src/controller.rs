//! The sync job controller.
//!
//! One logical worker per job key processes targets strictly sequentially —
//! no fan-out across targets, so the aggregate request rate against the
//! source site and the local helpers stays predictable. The job registry is
//! the only mutable shared state: one writer task per key, readers receive
//! cloned snapshots, and the lock is never held across an await.

use crate::error::SyncError;
use crate::job::{SyncJob, SyncMode, SyncSnapshot, SyncStatus};
use keyhaven_core::{CatalogError, CatalogStore, SyncConfig, Target};
use keyhaven_harvest::HarvestOrchestrator;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

const LOCK_POISONED: &str = "job registry lock poisoned: a writer panicked";

struct JobEntry {
    job: SyncJob,
    /// Monotonic finish time used for the retention window.
    finished: Option<Instant>,
}

/// Drives sync runs and answers polling snapshots.
pub struct SyncController {
    harvester: Arc<HarvestOrchestrator>,
    store: Arc<dyn CatalogStore>,
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
    retention: Duration,
    recent_limit: usize,
}

impl SyncController {
    /// Create a controller over the given harvester and catalog store.
    #[must_use]
    pub fn new(
        harvester: Arc<HarvestOrchestrator>,
        store: Arc<dyn CatalogStore>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            harvester,
            store,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            retention: Duration::from_secs(config.retention_secs),
            recent_limit: config.recent_games_limit,
        }
    }

    /// Start a sync run under `job_key`.
    ///
    /// Refused with [`SyncError::AlreadyRunning`] while a run for the same
    /// key is `Running`; a finished (or retained) job is replaced. On accept
    /// the worker task is spawned and this returns immediately.
    pub fn start(
        &self,
        job_key: &str,
        targets: Vec<Target>,
        mode: SyncMode,
    ) -> Result<(), SyncError> {
        {
            let mut jobs = self.jobs.write().expect(LOCK_POISONED);
            if jobs
                .get(job_key)
                .is_some_and(|entry| entry.job.status == SyncStatus::Running)
            {
                return Err(SyncError::AlreadyRunning {
                    job_key: job_key.to_string(),
                });
            }

            #[allow(clippy::cast_possible_truncation)]
            let total = targets.len() as u32;
            jobs.insert(
                job_key.to_string(),
                JobEntry {
                    job: SyncJob::new(job_key, mode, total),
                    finished: None,
                },
            );
        }

        tracing::info!(
            "sync '{}' started: {} targets, mode {}",
            job_key,
            targets.len(),
            mode.as_str()
        );

        let worker = Worker {
            harvester: self.harvester.clone(),
            store: self.store.clone(),
            jobs: self.jobs.clone(),
            job_key: job_key.to_string(),
            recent_limit: self.recent_limit,
        };
        tokio::spawn(async move { worker.run(targets).await });

        Ok(())
    }

    /// Current state for `job_key`, without mutating the job itself.
    ///
    /// This is the sole polling interface; there is no push channel.
    /// Finished jobs past the retention window read as `Idle` and their
    /// entries are pruned.
    #[must_use]
    pub fn snapshot(&self, job_key: &str) -> SyncSnapshot {
        let mut jobs = self.jobs.write().expect(LOCK_POISONED);
        match jobs.get(job_key) {
            Some(entry) => {
                let expired = entry.job.status.is_terminal()
                    && entry
                        .finished
                        .is_some_and(|finished| finished.elapsed() >= self.retention);
                if expired {
                    jobs.remove(job_key);
                    SyncSnapshot::idle()
                } else {
                    SyncSnapshot::from(&entry.job)
                }
            }
            None => SyncSnapshot::idle(),
        }
    }
}

/// Single writer for one job key.
struct Worker {
    harvester: Arc<HarvestOrchestrator>,
    store: Arc<dyn CatalogStore>,
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
    job_key: String,
    recent_limit: usize,
}

impl Worker {
    async fn run(self, targets: Vec<Target>) {
        match self.process(&targets).await {
            Ok(()) => {
                tracing::info!("sync '{}' completed", self.job_key);
                self.with_job(|entry| {
                    entry.job.complete();
                    entry.finished = Some(Instant::now());
                });
            }
            Err(err) => {
                tracing::error!("sync '{}' failed: {}", self.job_key, err);
                self.with_job(|entry| {
                    entry.job.fail(err.to_string());
                    entry.finished = Some(Instant::now());
                });
            }
        }
    }

    async fn process(&self, targets: &[Target]) -> Result<(), SyncError> {
        for target in targets {
            let report = self.harvester.harvest(&target.page_url).await;

            if report.candidates.is_empty() {
                // A target with nothing discoverable is a normal outcome.
                tracing::debug!(
                    "nothing new for '{}': {}",
                    target.game_name,
                    report.reason
                );
            } else {
                self.persist_target(target, report.candidates).await?;
            }

            // Progress advances after every target regardless of outcome.
            self.with_job(|entry| {
                entry.job.targets_processed =
                    (entry.job.targets_processed + 1).min(entry.job.targets_total);
            });
        }
        Ok(())
    }

    async fn persist_target(
        &self,
        target: &Target,
        candidates: Vec<keyhaven_core::CredentialCandidate>,
    ) -> Result<(), SyncError> {
        // Losing the catalog store at the game level is fatal for the run;
        // everything below it is tolerated per account.
        let (game, created) = self
            .store
            .find_or_create_game(&target.game_name)
            .await
            .map_err(|err| SyncError::Fatal(format!("catalog store: {err}")))?;

        let mut added: u32 = 0;
        for candidate in candidates {
            match self
                .store
                .create_account(&game.id, &candidate.identifier, &candidate.secret)
                .await
            {
                Ok(_) => added += 1,
                Err(CatalogError::Duplicate { identifier }) => {
                    tracing::debug!("skipping duplicate '{}'", identifier);
                }
                Err(err) => {
                    tracing::warn!(
                        "could not persist candidate for '{}': {}",
                        target.game_name,
                        err
                    );
                }
            }
        }

        let game_name = game.name.clone();
        let recent_limit = self.recent_limit;
        self.with_job(move |entry| {
            entry.job.accounts_added += added;
            if created {
                entry.job.games_added += 1;
                if added > 0 {
                    entry.job.push_recent_game(game_name, recent_limit);
                }
            }
        });

        Ok(())
    }

    fn with_job(&self, f: impl FnOnce(&mut JobEntry)) {
        if let Some(entry) = self
            .jobs
            .write()
            .expect(LOCK_POISONED)
            .get_mut(&self.job_key)
        {
            f(entry);
        }
    }
}
