//! Keyhaven Harvest - Credential acquisition through a strategy chain.
//!
//! This crate discovers candidate credentials for a target by trying an
//! ordered chain of acquisition channels with graceful degradation: a local
//! accelerator helper, a local full-rendering helper, a direct fetch, and
//! finally public relays. The first source that yields candidates wins; the
//! chain order is a correctness contract, not an implementation detail.
//!
//! # Example
//!
//! ```rust,ignore
//! use keyhaven_core::AppConfig;
//! use keyhaven_harvest::HarvestOrchestrator;
//!
//! let config = AppConfig::load_with_env()?;
//! let orchestrator = HarvestOrchestrator::from_config(&config.harvest)?;
//! let report = orchestrator.harvest("https://source.example/games/77").await;
//! match report.source {
//!     Some(source) => println!("{} candidates via {source}", report.candidates.len()),
//!     None => println!("nothing found: {}", report.reason),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod orchestrator;
pub mod source;
pub mod sources;

// Re-export commonly used types
pub use error::{HarvestError, Result};
pub use orchestrator::{HarvestOrchestrator, HarvestReport};
pub use source::{CredentialSource, SourceOutcome};
pub use sources::{AcceleratorSource, DirectSource, RelaySource, RendererSource};
