//! Concrete source strategies, in preference order: accelerator, renderer,
//! direct fetch, public relays.

mod accelerator;
mod direct;
mod relay;
mod renderer;

pub use accelerator::AcceleratorSource;
pub use direct::DirectSource;
pub use relay::RelaySource;
pub use renderer::RendererSource;

use keyhaven_core::CredentialCandidate;
use serde::Deserialize;
use std::time::Duration;

/// Wire response of the local helper processes.
///
/// Contract: `POST {"url": target}` answered with `{"candidates": [...]}` or
/// `{"error": "..."}`. Field spellings from older helper builds are accepted
/// via aliases.
#[derive(Debug, Deserialize)]
pub(crate) struct HelperResponse {
    #[serde(default)]
    pub candidates: Vec<WireCandidate>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCandidate {
    #[serde(alias = "username")]
    pub identifier: String,
    #[serde(alias = "password")]
    pub secret: String,
}

impl From<WireCandidate> for CredentialCandidate {
    fn from(wire: WireCandidate) -> Self {
        Self::new(wire.identifier, wire.secret)
    }
}

/// Probe an HTTP endpoint for liveness: any response counts as reachable,
/// any transport failure (refused, DNS, timeout) as absent. Helper absence
/// is a normal condition, so failures log at debug only.
pub(crate) async fn probe_endpoint(
    client: &reqwest::Client,
    endpoint: &str,
    timeout: Duration,
) -> bool {
    match client.get(endpoint).timeout(timeout).send().await {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!("probe of {} failed: {}", endpoint, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_response_wire_shapes() {
        let json = r#"{"candidates": [{"identifier": "keeper77", "secret": "pw-x1!aa"}]}"#;
        let parsed: HelperResponse = serde_json::from_str(json).expect("parse candidates");
        assert_eq!(parsed.candidates.len(), 1);
        assert!(parsed.error.is_none());

        let json = r#"{"candidates": [{"username": "keeper77", "password": "pw-x1!aa"}]}"#;
        let parsed: HelperResponse = serde_json::from_str(json).expect("parse aliased fields");
        assert_eq!(parsed.candidates[0].identifier, "keeper77");
        assert_eq!(parsed.candidates[0].secret, "pw-x1!aa");

        let json = r#"{"error": "blocked upstream"}"#;
        let parsed: HelperResponse = serde_json::from_str(json).expect("parse error shape");
        assert!(parsed.candidates.is_empty());
        assert_eq!(parsed.error.as_deref(), Some("blocked upstream"));
    }

    #[tokio::test]
    async fn test_probe_unreachable_endpoint_is_false() {
        let client = reqwest::Client::new();
        // Reserved TEST-NET-1 address; nothing listens there.
        let reachable =
            probe_endpoint(&client, "http://192.0.2.1:9/", Duration::from_millis(200)).await;
        assert!(!reachable);
    }
}
