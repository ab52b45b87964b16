//! The source strategy contract.

use crate::error::Result;
use async_trait::async_trait;
use keyhaven_core::CredentialCandidate;
use std::time::Duration;

/// Outcome of one source strategy attempt.
///
/// Drives chain fallthrough in the orchestrator; never persisted.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    /// Candidates the source produced (already sanitized and deduplicated)
    pub candidates: Vec<CredentialCandidate>,
    /// Whether the source considers the attempt useful
    pub succeeded: bool,
    /// Human-readable reason, surfaced when the whole chain comes up empty
    pub reason: String,
}

impl SourceOutcome {
    /// A successful outcome carrying candidates.
    #[must_use]
    pub fn found(candidates: Vec<CredentialCandidate>) -> Self {
        Self {
            candidates,
            succeeded: true,
            reason: "ok".to_string(),
        }
    }

    /// A normal empty outcome with a reportable reason.
    #[must_use]
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            succeeded: false,
            reason: reason.into(),
        }
    }
}

/// One acquisition channel in the strategy chain.
///
/// Implementations must keep `probe` cheap and bounded: any transport
/// failure reads as unreachable, and raw errors never propagate out of it.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Stable strategy name used in reports and logs.
    fn name(&self) -> &'static str;

    /// Cheap liveness check. Must return within `timeout` and map every
    /// failure to `false`.
    async fn probe(&self, timeout: Duration) -> bool;

    /// Retrieve content for `target` and produce candidates.
    async fn fetch(&self, target: &str) -> Result<SourceOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        let found = SourceOutcome::found(vec![CredentialCandidate::new("keeper77", "pw-x1!aa")]);
        assert!(found.succeeded);
        assert_eq!(found.candidates.len(), 1);

        let empty = SourceOutcome::empty("no-match");
        assert!(!empty.succeeded);
        assert!(empty.candidates.is_empty());
        assert_eq!(empty.reason, "no-match");
    }

    #[test]
    fn test_source_is_object_safe() {
        fn assert_object_safe(_: Option<&dyn CredentialSource>) {}
        assert_object_safe(None);
    }
}
