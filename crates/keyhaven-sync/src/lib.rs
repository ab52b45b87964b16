//! Keyhaven Sync - Catalog refresh job control.
//!
//! This crate owns the lifecycle of a sync run: it schedules targets,
//! invokes the harvest orchestrator and persistence per target, updates a
//! shared progress record, and exposes a polling snapshot. One job key maps
//! to at most one running job; a second start for the same key is refused,
//! never queued.
//!
//! # Example
//!
//! ```rust,ignore
//! use keyhaven_sync::{SyncController, SyncMode};
//!
//! let controller = SyncController::new(harvester, store, &config.sync);
//! controller.start("global", targets, SyncMode::Full)?;
//! loop {
//!     let snapshot = controller.snapshot("global");
//!     println!("{}% done", snapshot.percent);
//!     if snapshot.status.is_terminal() {
//!         break;
//!     }
//!     tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod controller;
pub mod error;
pub mod job;
pub mod schedule;

// Re-export commonly used types
pub use controller::SyncController;
pub use error::SyncError;
pub use job::{SyncJob, SyncMode, SyncSnapshot, SyncStatus};
pub use schedule::{is_refresh_due, next_refresh_timestamp};
