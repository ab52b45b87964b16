//! Public relay fallback.

use crate::error::Result;
use crate::source::{CredentialSource, SourceOutcome};
use async_trait::async_trait;
use std::time::Duration;

/// Last strategy in the chain: fetch the target through public relay
/// endpoints, tried in configured order with a short per-relay budget. Slow
/// and rate-limited upstream, but reachable when everything else is blocked.
pub struct RelaySource {
    client: reqwest::Client,
    relays: Vec<String>,
    per_relay_timeout: Duration,
}

impl RelaySource {
    /// Create a relay source over `relays` prefixes. The target URL is
    /// appended percent-encoded to each prefix.
    #[must_use]
    pub fn new(client: reqwest::Client, relays: Vec<String>, per_relay_timeout: Duration) -> Self {
        Self {
            client,
            relays,
            per_relay_timeout,
        }
    }
}

#[async_trait]
impl CredentialSource for RelaySource {
    fn name(&self) -> &'static str {
        "relay"
    }

    // Public relays are not worth a dedicated liveness round-trip; real
    // reachability is discovered per relay during the fetch.
    async fn probe(&self, _timeout: Duration) -> bool {
        !self.relays.is_empty()
    }

    async fn fetch(&self, target: &str) -> Result<SourceOutcome> {
        let encoded = urlencoding::encode(target);
        let mut reasons: Vec<String> = Vec::new();

        for relay in &self.relays {
            let url = format!("{relay}{encoded}");
            let body = match self
                .client
                .get(&url)
                .timeout(self.per_relay_timeout)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => match response.text().await {
                    Ok(body) => body,
                    Err(err) => {
                        reasons.push(format!("{relay}: body read failed ({err})"));
                        continue;
                    }
                },
                Ok(response) => {
                    reasons.push(format!("{relay}: status {}", response.status().as_u16()));
                    continue;
                }
                Err(err) => {
                    tracing::debug!("relay {} failed: {}", relay, err);
                    reasons.push(format!("{relay}: {err}"));
                    continue;
                }
            };

            let candidates = keyhaven_extract::extract(&body);
            if !candidates.is_empty() {
                return Ok(SourceOutcome::found(candidates));
            }
            reasons.push(format!("{relay}: no-match"));
        }

        if reasons.is_empty() {
            Ok(SourceOutcome::empty("no relays configured"))
        } else {
            Ok(SourceOutcome::empty(reasons.join("; ")))
        }
    }
}
