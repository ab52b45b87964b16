//! Shared types used across the Keyhaven application.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::KeyhavenError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn uuid_regex() -> &'static Regex {
    static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
    UUID_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
            .expect("valid regex")
    })
}

/// Newtype for game identifiers with validation.
///
/// Game IDs must be valid UUIDs (v4 format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(String);

impl GameId {
    /// Create a new `GameId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a valid UUID v4.
    pub fn new(id: impl Into<String>) -> Result<Self, KeyhavenError> {
        let id = id.into();
        if uuid_regex().is_match(&id) {
            Ok(Self(id))
        } else {
            Err(KeyhavenError::Validation(format!(
                "invalid game ID: must be a valid UUID v4, got '{id}'"
            )))
        }
    }

    /// Create a new random `GameId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for account identifiers with validation.
///
/// Account IDs must be valid UUIDs (v4 format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new `AccountId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a valid UUID v4.
    pub fn new(id: impl Into<String>) -> Result<Self, KeyhavenError> {
        let id = id.into();
        if uuid_regex().is_match(&id) {
            Ok(Self(id))
        } else {
            Err(KeyhavenError::Validation(format!(
                "invalid account ID: must be a valid UUID v4, got '{id}'"
            )))
        }
    }

    /// Create a new random `AccountId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unvalidated identifier/secret pair extracted from raw content.
///
/// Candidates are transient: they are either persisted as a new [`Account`]
/// or discarded as duplicates within the same harvest batch. Identifier
/// comparison is case-insensitive throughout.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialCandidate {
    /// Login identifier (username or email)
    pub identifier: String,
    /// Login secret (password)
    pub secret: String,
}

impl CredentialCandidate {
    /// Create a new candidate pair.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Case-insensitive identifier comparison.
    #[must_use]
    pub fn matches_identifier(&self, other: &str) -> bool {
        self.identifier.eq_ignore_ascii_case(other)
    }
}

// The secret never goes to logs.
impl fmt::Debug for CredentialCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCandidate")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Verification state of a catalogued account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Never checked against the platform
    #[default]
    Unverified,
    /// Last check logged in successfully
    Valid,
    /// Last check was rejected by the platform
    Invalid,
    /// The platform asked for a second factor; automated checks cannot finish
    SecondFactorRequired,
    /// The account is locked or blocked
    Locked,
    /// The last check timed out or failed in an unclassified way
    Unknown,
}

impl AccountStatus {
    /// Stable string form used for storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "Unverified",
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::SecondFactorRequired => "SecondFactorRequired",
            Self::Locked => "Locked",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = KeyhavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unverified" => Ok(Self::Unverified),
            "Valid" => Ok(Self::Valid),
            "Invalid" => Ok(Self::Invalid),
            "SecondFactorRequired" => Ok(Self::SecondFactorRequired),
            "Locked" => Ok(Self::Locked),
            "Unknown" => Ok(Self::Unknown),
            other => Err(KeyhavenError::Validation(format!(
                "invalid account status '{other}'"
            ))),
        }
    }
}

/// A catalogued shared account for a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account row
    pub id: AccountId,
    /// Game this account belongs to
    pub game_id: GameId,
    /// Login identifier (username or email)
    pub identifier: String,
    /// Login secret (password)
    pub secret: String,
    /// Current verification state
    pub status: AccountStatus,
    /// When the account was last checked, if ever
    pub last_tested_at: Option<DateTime<Utc>>,
    /// When the account was catalogued
    pub created_at: DateTime<Utc>,
}

/// A game entry in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier for the game
    pub id: GameId,
    /// Display name, unique case-insensitively
    pub name: String,
    /// When the game was first catalogued
    pub created_at: DateTime<Utc>,
}

/// One game/catalog entry for which credentials are being sought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Game name as known to the catalog
    pub game_name: String,
    /// Source-site page to harvest for this game
    pub page_url: String,
}

impl Target {
    /// Create a new harvest target.
    pub fn new(game_name: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            page_url: page_url.into(),
        }
    }
}
