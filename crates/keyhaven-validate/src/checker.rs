//! The authentication-check collaborator contract.
//!
//! The core does not prescribe a specific verification tool; it needs a
//! collaborator that can attempt one login and report what the platform
//! said. `Unavailable` is deliberately distinct from transport failures:
//! a missing checker aborts a batch, a flaky check only marks one pair.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// What the platform said about one credential pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckVerdict {
    /// Login completed
    Accepted,
    /// The platform asked for a second factor
    SecondFactorRequested,
    /// Credentials rejected
    Rejected,
    /// Account locked or blocked
    LockedOut,
}

/// Raw outcome of one authentication check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Platform verdict
    pub verdict: CheckVerdict,
    /// Optional detail text from the checker
    pub detail: Option<String>,
}

/// Errors from the checker collaborator.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// The checker itself is missing or reports its own dependency missing.
    /// Aborts the batch; remaining pairs are never attempted.
    #[error("authentication checker unavailable: {0}")]
    Unavailable(String),

    /// Transport failure or unclassifiable answer for this one pair.
    /// Classified as `Unknown` and the batch continues.
    #[error("check failed: {0}")]
    Transport(String),
}

/// Performs one live authentication check per call.
#[async_trait]
pub trait AuthChecker: Send + Sync {
    /// Attempt a login with the pair, bounded by `timeout`.
    async fn check(
        &self,
        identifier: &str,
        secret: &str,
        timeout: Duration,
    ) -> Result<CheckReport, CheckerError>;
}

/// Wire response of the local checker helper.
#[derive(Debug, Deserialize)]
struct CheckerResponse {
    outcome: String,
    #[serde(default)]
    detail: Option<String>,
}

/// HTTP-backed checker against a local helper endpoint.
///
/// Contract: `POST {identifier, secret}` answered with
/// `{"outcome": "valid" | "second_factor" | "invalid" | "locked" |
/// "unavailable", "detail": ...}`. Connection refusal and HTTP 503 both
/// read as the checker being unavailable.
pub struct HttpAuthChecker {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAuthChecker {
    /// Create a checker against `endpoint`.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl AuthChecker for HttpAuthChecker {
    async fn check(
        &self,
        identifier: &str,
        secret: &str,
        timeout: Duration,
    ) -> Result<CheckReport, CheckerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "identifier": identifier, "secret": secret }))
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() {
                    CheckerError::Unavailable(err.to_string())
                } else {
                    CheckerError::Transport(err.to_string())
                }
            })?;

        if response.status().as_u16() == 503 {
            return Err(CheckerError::Unavailable("checker reported 503".to_string()));
        }
        if !response.status().is_success() {
            return Err(CheckerError::Transport(format!(
                "checker status {}",
                response.status().as_u16()
            )));
        }

        let body: CheckerResponse = response
            .json()
            .await
            .map_err(|err| CheckerError::Transport(format!("malformed checker response: {err}")))?;

        let verdict = match body.outcome.as_str() {
            "valid" => CheckVerdict::Accepted,
            "second_factor" => CheckVerdict::SecondFactorRequested,
            "invalid" => CheckVerdict::Rejected,
            "locked" => CheckVerdict::LockedOut,
            "unavailable" => {
                return Err(CheckerError::Unavailable(
                    body.detail.unwrap_or_else(|| "checker dependency missing".to_string()),
                ))
            }
            other => {
                return Err(CheckerError::Transport(format!(
                    "unclassified checker outcome '{other}'"
                )))
            }
        };

        Ok(CheckReport {
            verdict,
            detail: body.detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_response_wire_shapes() {
        let json = r#"{"outcome": "valid"}"#;
        let parsed: CheckerResponse = serde_json::from_str(json).expect("parse outcome");
        assert_eq!(parsed.outcome, "valid");
        assert!(parsed.detail.is_none());

        let json = r#"{"outcome": "locked", "detail": "too many attempts"}"#;
        let parsed: CheckerResponse = serde_json::from_str(json).expect("parse detail");
        assert_eq!(parsed.detail.as_deref(), Some("too many attempts"));
    }

    #[tokio::test]
    async fn test_connect_refusal_is_unavailable() {
        let checker = HttpAuthChecker::new(
            reqwest::Client::new(),
            // Reserved TEST-NET-1 address; nothing listens there.
            "http://192.0.2.1:9/check".to_string(),
        );
        let result = checker
            .check("keeper77", "pw-x1!aa", Duration::from_millis(200))
            .await;
        // Refusal or timeout, depending on the network stack; either way it
        // must surface as an error, never a verdict.
        assert!(result.is_err());
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let unavailable = CheckerError::Unavailable("gone".to_string());
        let transport = CheckerError::Transport("reset".to_string());
        assert!(matches!(unavailable, CheckerError::Unavailable(_)));
        assert!(matches!(transport, CheckerError::Transport(_)));
    }
}
