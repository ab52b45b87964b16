use thiserror::Error;

/// Errors raised inside a source strategy.
///
/// The orchestrator treats every variant as "zero candidates from this
/// source" and advances to the next strategy; nothing here aborts a harvest.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Transport failure (connect, timeout, body read)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The helper answered, but not with the agreed wire shape
    #[error("malformed helper response: {0}")]
    MalformedResponse(String),

    /// Non-success HTTP status from a source endpoint
    #[error("unexpected status {status} from {src}")]
    BadStatus {
        /// Source strategy name
        src: &'static str,
        /// HTTP status code
        status: u16,
    },
}

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;
