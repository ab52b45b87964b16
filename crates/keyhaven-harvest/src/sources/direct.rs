//! Direct page fetch.

use crate::error::{HarvestError, Result};
use crate::source::{CredentialSource, SourceOutcome};
use crate::sources::probe_endpoint;
use async_trait::async_trait;
use std::time::Duration;

/// Third strategy: fetch the target page ourselves. Often blocked by the
/// source site's anti-bot layer, which is why two helpers sit ahead of it
/// in the chain.
pub struct DirectSource {
    client: reqwest::Client,
    /// Source-site base URL for the liveness probe; when unset the probe
    /// optimistically passes and the fetch itself decides.
    base_url: Option<String>,
    fetch_timeout: Duration,
}

impl DirectSource {
    /// Create a direct-fetch source.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: Option<String>, fetch_timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            fetch_timeout,
        }
    }
}

#[async_trait]
impl CredentialSource for DirectSource {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn probe(&self, timeout: Duration) -> bool {
        match &self.base_url {
            Some(base) => probe_endpoint(&self.client, base, timeout).await,
            None => true,
        }
    }

    async fn fetch(&self, target: &str) -> Result<SourceOutcome> {
        let response = self
            .client
            .get(target)
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

        let body = response.text().await?;
        let candidates = keyhaven_extract::extract(&body);

        if candidates.is_empty() {
            Ok(SourceOutcome::empty("no-match"))
        } else {
            Ok(SourceOutcome::found(candidates))
        }
    }
}
