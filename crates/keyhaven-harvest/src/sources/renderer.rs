//! Local full-rendering helper.

use crate::error::{HarvestError, Result};
use crate::source::{CredentialSource, SourceOutcome};
use crate::sources::{probe_endpoint, HelperResponse};
use async_trait::async_trait;
use keyhaven_core::CredentialCandidate;
use std::time::Duration;

/// Second strategy: a heavier helper that drives a real browser engine for
/// pages the accelerator cannot render. Same wire contract as the
/// accelerator, on its own fixed local endpoint, with a longer fetch budget.
pub struct RendererSource {
    client: reqwest::Client,
    endpoint: String,
    fetch_timeout: Duration,
}

impl RendererSource {
    /// Create a renderer source against `endpoint`.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: String, fetch_timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            fetch_timeout,
        }
    }
}

#[async_trait]
impl CredentialSource for RendererSource {
    fn name(&self) -> &'static str {
        "renderer"
    }

    async fn probe(&self, timeout: Duration) -> bool {
        probe_endpoint(&self.client, &self.endpoint, timeout).await
    }

    async fn fetch(&self, target: &str) -> Result<SourceOutcome> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "url": target }))
            .timeout(self.fetch_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::BadStatus {
                src: self.name(),
                status: status.as_u16(),
            });
        }

        let body: HelperResponse = response
            .json()
            .await
            .map_err(|e| HarvestError::MalformedResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Ok(SourceOutcome::empty(format!("helper error: {error}")));
        }

        let candidates: Vec<CredentialCandidate> =
            body.candidates.into_iter().map(Into::into).collect();
        let candidates = keyhaven_extract::sanitize_candidates(candidates);

        if candidates.is_empty() {
            Ok(SourceOutcome::empty("no-match"))
        } else {
            Ok(SourceOutcome::found(candidates))
        }
    }
}
