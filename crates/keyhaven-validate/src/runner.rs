//! The sequential validation runner.

use crate::checker::{AuthChecker, CheckVerdict, CheckerError};
use chrono::Utc;
use keyhaven_core::{Account, AccountStatus, CatalogStore, ValidationConfig};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of validating one credential pair.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    /// Identifier that was checked
    pub identifier: String,
    /// Whether the login completed
    pub succeeded: bool,
    /// Classified account status
    pub status: AccountStatus,
    /// Human-readable reason text
    pub reason: String,
    /// Wall-clock duration of the check in milliseconds
    pub duration_ms: u64,
}

/// Result of a whole validation batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Outcomes in input order, one per attempted pair
    pub outcomes: Vec<ValidationOutcome>,
    /// Set when the checker reported itself unavailable and the batch was
    /// aborted; distinct from any per-pair failure so callers can suggest
    /// retrying later instead of implying the remaining credentials are bad.
    pub checker_unavailable: bool,
}

/// Validates credential pairs strictly sequentially under a rate limit.
///
/// The inter-check delay is a hard floor, not a suggestion: it exists to
/// avoid triggering anti-automation lockouts on the target platform and is
/// applied after every pair except the last, even when the check itself was
/// fast.
pub struct ValidationRunner {
    checker: Arc<dyn AuthChecker>,
    store: Arc<dyn CatalogStore>,
    min_delay: Duration,
    check_timeout: Duration,
}

impl ValidationRunner {
    /// Create a runner over the given checker and persistence collaborator.
    #[must_use]
    pub fn new(
        checker: Arc<dyn AuthChecker>,
        store: Arc<dyn CatalogStore>,
        config: &ValidationConfig,
    ) -> Self {
        Self {
            checker,
            store,
            min_delay: Duration::from_millis(config.min_delay_ms),
            check_timeout: Duration::from_millis(config.check_timeout_ms),
        }
    }

    /// Validate `accounts` in order. Returns outcomes in the same order; on
    /// checker unavailability the batch stops immediately with the outcomes
    /// collected so far.
    pub async fn validate_batch(&self, accounts: &[Account]) -> BatchReport {
        let mut outcomes: Vec<ValidationOutcome> = Vec::with_capacity(accounts.len());
        let mut checker_unavailable = false;

        for (index, account) in accounts.iter().enumerate() {
            let started = Instant::now();
            let result = tokio::time::timeout(
                self.check_timeout,
                self.checker
                    .check(&account.identifier, &account.secret, self.check_timeout),
            )
            .await;
            #[allow(clippy::cast_possible_truncation)]
            let duration_ms = started.elapsed().as_millis() as u64;

            let (status, reason) = match result {
                Ok(Ok(report)) => {
                    let status = classify(report.verdict);
                    let reason = report
                        .detail
                        .unwrap_or_else(|| default_reason(status).to_string());
                    (status, reason)
                }
                Ok(Err(CheckerError::Unavailable(reason))) => {
                    tracing::warn!("authentication checker unavailable: {}", reason);
                    checker_unavailable = true;
                    break;
                }
                Ok(Err(CheckerError::Transport(reason))) => (AccountStatus::Unknown, reason),
                Err(_) => (AccountStatus::Unknown, "check timed out".to_string()),
            };

            outcomes.push(ValidationOutcome {
                identifier: account.identifier.clone(),
                succeeded: status == AccountStatus::Valid,
                status,
                reason,
                duration_ms,
            });

            // Fire-and-forget status persistence; a failed update never
            // aborts the batch.
            if let Err(err) = self
                .store
                .update_account_status(&account.id, status, Utc::now())
                .await
            {
                tracing::warn!(
                    "failed to persist status for {}: {}",
                    account.identifier,
                    err
                );
            }

            if index + 1 < accounts.len() {
                tokio::time::sleep(self.min_delay).await;
            }
        }

        BatchReport {
            outcomes,
            checker_unavailable,
        }
    }
}

/// Classification precedence: success, second factor, rejection, lockout;
/// everything else lands on `Unknown` upstream of this mapping.
fn classify(verdict: CheckVerdict) -> AccountStatus {
    match verdict {
        CheckVerdict::Accepted => AccountStatus::Valid,
        CheckVerdict::SecondFactorRequested => AccountStatus::SecondFactorRequired,
        CheckVerdict::Rejected => AccountStatus::Invalid,
        CheckVerdict::LockedOut => AccountStatus::Locked,
    }
}

fn default_reason(status: AccountStatus) -> &'static str {
    match status {
        AccountStatus::Valid => "login succeeded",
        AccountStatus::SecondFactorRequired => "second factor requested",
        AccountStatus::Invalid => "credentials rejected",
        AccountStatus::Locked => "account locked",
        AccountStatus::Unknown | AccountStatus::Unverified => "unclassified",
    }
}
