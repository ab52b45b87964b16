//! Keyhaven Extract - Pure credential extraction from raw page content.
//!
//! This crate turns raw, possibly hostile page content into candidate
//! identifier/secret pairs. It performs no I/O, never panics on malformed
//! input, and treats "nothing found" as a normal empty result.
//!
//! # Example
//!
//! ```rust
//! use keyhaven_extract::extract;
//!
//! let page = "Shared accounts for the launch week, rotated every Friday. \
//!             Username: nightowl42 Password: Rq7!mv9z Username: daysailor \
//!             Password: k2#Wmfp0";
//! let candidates = extract(page);
//! assert_eq!(candidates.len(), 2);
//! assert_eq!(candidates[0].identifier, "nightowl42");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod extract;

pub use extract::{extract, sanitize_candidates};
