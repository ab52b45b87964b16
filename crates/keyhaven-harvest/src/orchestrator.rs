//! Harvest orchestration across the strategy chain.
//!
//! Strategies are tried strictly in their declared order; the first source
//! returning one or more candidates ends the chain. Later sources never
//! supplement an earlier result — sources differ in trustworthiness and
//! their results must not be mixed within one harvest call.

use crate::source::CredentialSource;
use crate::sources::{AcceleratorSource, DirectSource, RelaySource, RendererSource};
use keyhaven_core::{CredentialCandidate, HarvestConfig};
use serde::Serialize;
use std::time::Duration;

/// Result of one harvest call.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    /// Deduplicated candidates from the winning source
    pub candidates: Vec<CredentialCandidate>,
    /// Name of the source that produced the candidates, `None` when every
    /// strategy came up empty
    pub source: Option<String>,
    /// Aggregate per-source reason string; "ok" on success
    pub reason: String,
}

impl HarvestReport {
    fn empty(reason: String) -> Self {
        Self {
            candidates: Vec::new(),
            source: None,
            reason,
        }
    }
}

/// Runs the ordered source chain for one target.
pub struct HarvestOrchestrator {
    sources: Vec<Box<dyn CredentialSource>>,
    probe_timeout: Duration,
}

impl HarvestOrchestrator {
    /// Create an orchestrator over an explicit chain, in preference order.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn CredentialSource>>, probe_timeout: Duration) -> Self {
        Self {
            sources,
            probe_timeout,
        }
    }

    /// Build the standard four-source chain from configuration:
    /// accelerator, renderer, direct fetch, relays.
    pub fn from_config(config: &HarvestConfig) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        let sources: Vec<Box<dyn CredentialSource>> = vec![
            Box::new(AcceleratorSource::new(
                client.clone(),
                config.accelerator_url.clone(),
                Duration::from_millis(config.accelerator_timeout_ms),
            )),
            Box::new(RendererSource::new(
                client.clone(),
                config.renderer_url.clone(),
                Duration::from_millis(config.renderer_timeout_ms),
            )),
            Box::new(DirectSource::new(
                client.clone(),
                config.source_base_url.clone(),
                Duration::from_millis(config.relay_timeout_ms),
            )),
            Box::new(RelaySource::new(
                client,
                config.relay_endpoints.clone(),
                Duration::from_millis(config.relay_timeout_ms),
            )),
        ];

        Ok(Self::new(
            sources,
            Duration::from_millis(config.probe_timeout_ms),
        ))
    }

    /// Run the chain for `target`. First source with candidates wins; a
    /// fully empty chain is a normal outcome carrying an aggregate reason,
    /// never an error.
    pub async fn harvest(&self, target: &str) -> HarvestReport {
        let mut attempts: Vec<String> = Vec::new();

        for source in &self.sources {
            let name = source.name();

            // Hard cap on the probe budget regardless of implementation.
            let reachable = tokio::time::timeout(self.probe_timeout, source.probe(self.probe_timeout))
                .await
                .unwrap_or(false);
            if !reachable {
                tracing::debug!("source {} unreachable, skipping", name);
                attempts.push(format!("{name}: unreachable"));
                continue;
            }

            match source.fetch(target).await {
                Ok(outcome) if !outcome.candidates.is_empty() => {
                    tracing::info!(
                        "harvested {} candidates for {} via {}",
                        outcome.candidates.len(),
                        target,
                        name
                    );
                    return HarvestReport {
                        candidates: outcome.candidates,
                        source: Some(name.to_string()),
                        reason: outcome.reason,
                    };
                }
                Ok(outcome) => {
                    attempts.push(format!("{name}: {}", outcome.reason));
                }
                // Transport-level failures read the same as zero candidates.
                Err(err) => {
                    tracing::debug!("source {} failed: {}", name, err);
                    attempts.push(format!("{name}: {err}"));
                }
            }
        }

        HarvestReport::empty(attempts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarvestError;
    use crate::source::{CredentialSource, SourceOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum StubBehavior {
        Unreachable,
        Candidates(Vec<CredentialCandidate>),
        Empty,
        TransportError,
    }

    struct StubSource {
        name: &'static str,
        behavior: StubBehavior,
        fetch_calls: Arc<AtomicUsize>,
    }

    impl StubSource {
        fn boxed(name: &'static str, behavior: StubBehavior) -> (Box<dyn CredentialSource>, Arc<AtomicUsize>) {
            let fetch_calls = Arc::new(AtomicUsize::new(0));
            let stub = Self {
                name,
                behavior,
                fetch_calls: fetch_calls.clone(),
            };
            (Box::new(stub), fetch_calls)
        }
    }

    #[async_trait]
    impl CredentialSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn probe(&self, _timeout: Duration) -> bool {
            !matches!(self.behavior, StubBehavior::Unreachable)
        }

        async fn fetch(&self, _target: &str) -> crate::error::Result<SourceOutcome> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                StubBehavior::Unreachable => unreachable!("fetch on unreachable source"),
                StubBehavior::Candidates(candidates) => {
                    Ok(SourceOutcome::found(candidates.clone()))
                }
                StubBehavior::Empty => Ok(SourceOutcome::empty("no-match")),
                StubBehavior::TransportError => Err(HarvestError::MalformedResponse(
                    "connection reset".to_string(),
                )),
            }
        }
    }

    fn candidates(names: &[&str]) -> Vec<CredentialCandidate> {
        names
            .iter()
            .map(|n| CredentialCandidate::new(*n, format!("{n}-pw1")))
            .collect()
    }

    #[tokio::test]
    async fn test_first_success_wins_later_sources_untouched() {
        let (first, _) = StubSource::boxed("accelerator", StubBehavior::Unreachable);
        let (second, second_calls) =
            StubSource::boxed("renderer", StubBehavior::Candidates(candidates(&["alpha", "bravo"])));
        let (third, third_calls) = StubSource::boxed(
            "direct",
            StubBehavior::Candidates(candidates(&["c1", "c2", "c3", "c4", "c5"])),
        );

        let orchestrator = HarvestOrchestrator::new(
            vec![first, second, third],
            Duration::from_millis(100),
        );
        let report = orchestrator.harvest("https://source.example/games/77").await;

        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.candidates[0].identifier, "alpha");
        assert_eq!(report.source.as_deref(), Some("renderer"));
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_error_advances_chain() {
        let (first, _) = StubSource::boxed("accelerator", StubBehavior::TransportError);
        let (second, _) =
            StubSource::boxed("renderer", StubBehavior::Candidates(candidates(&["alpha"])));

        let orchestrator =
            HarvestOrchestrator::new(vec![first, second], Duration::from_millis(100));
        let report = orchestrator.harvest("https://source.example/games/77").await;

        assert_eq!(report.source.as_deref(), Some("renderer"));
        assert_eq!(report.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_all_empty_aggregates_reasons() {
        let (first, _) = StubSource::boxed("accelerator", StubBehavior::Unreachable);
        let (second, _) = StubSource::boxed("renderer", StubBehavior::Empty);
        let (third, _) = StubSource::boxed("direct", StubBehavior::TransportError);

        let orchestrator =
            HarvestOrchestrator::new(vec![first, second, third], Duration::from_millis(100));
        let report = orchestrator.harvest("https://source.example/games/77").await;

        assert!(report.candidates.is_empty());
        assert!(report.source.is_none());
        assert!(report.reason.contains("accelerator: unreachable"));
        assert!(report.reason.contains("renderer: no-match"));
        assert!(report.reason.contains("direct:"));
    }

    #[tokio::test]
    async fn test_slow_probe_is_hard_capped() {
        struct SlowProbe;

        #[async_trait]
        impl CredentialSource for SlowProbe {
            fn name(&self) -> &'static str {
                "slow"
            }
            async fn probe(&self, _timeout: Duration) -> bool {
                // Misbehaving implementation that ignores its budget.
                tokio::time::sleep(Duration::from_secs(3600)).await;
                true
            }
            async fn fetch(&self, _target: &str) -> crate::error::Result<SourceOutcome> {
                unreachable!("fetch after capped probe");
            }
        }

        tokio::time::pause();
        let orchestrator =
            HarvestOrchestrator::new(vec![Box::new(SlowProbe)], Duration::from_millis(2000));
        let report = orchestrator.harvest("https://source.example/games/77").await;
        assert!(report.candidates.is_empty());
        assert!(report.reason.contains("slow: unreachable"));
    }
}
