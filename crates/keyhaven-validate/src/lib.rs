//! Keyhaven Validate - Rate-limited credential validation.
//!
//! This crate checks catalogued credentials against the platform's
//! authentication service, strictly one at a time, with a hard minimum
//! delay between checks. The delay is the lockout defence: the runner is
//! sequential by construction so the aggregate request rate stays
//! predictable no matter how large the batch is.
//!
//! # Example
//!
//! ```rust,ignore
//! use keyhaven_validate::{HttpAuthChecker, ValidationRunner};
//!
//! let checker = HttpAuthChecker::new(&config.validation)?;
//! let runner = ValidationRunner::new(Arc::new(checker), store, &config.validation);
//! let report = runner.validate_batch(&accounts).await;
//! if report.checker_unavailable {
//!     println!("checker offline, try again later");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod checker;
pub mod runner;

// Re-export commonly used types
pub use checker::{AuthChecker, CheckReport, CheckVerdict, CheckerError, HttpAuthChecker};
pub use runner::{BatchReport, ValidationOutcome, ValidationRunner};
