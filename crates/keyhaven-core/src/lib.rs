//! Keyhaven Core - Foundation crate for the Keyhaven credential catalog.
//!
//! This crate provides shared types, error handling, configuration management,
//! and the catalog store contract that all other Keyhaven crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`GameId`, `AccountId`, `AccountStatus`)
//! - [`catalog`] - The `CatalogStore` collaborator trait and its error type
//!
//! # Example
//!
//! ```rust
//! use keyhaven_core::{AccountStatus, AppConfig, CredentialCandidate};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration (defaults when no file exists)
//! let config = AppConfig::default();
//! assert_eq!(config.validation.min_delay_ms, 5000);
//!
//! let candidate = CredentialCandidate::new("player01", "hunter2-x");
//! assert!(candidate.matches_identifier("PLAYER01"));
//! assert_eq!(AccountStatus::default(), AccountStatus::Unverified);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use catalog::{CatalogError, CatalogResult, CatalogStore};
pub use config::{AppConfig, HarvestConfig, SyncConfig, ValidationConfig};
pub use error::{ConfigError, ConfigResult, KeyhavenError, Result};
pub use types::{Account, AccountId, AccountStatus, CredentialCandidate, Game, GameId, Target};
