//! GoDork Core - Foundation crate for the GoDork harvester.
//!
//! This crate provides the shared types, error handling, configuration management
//! and the challenge-solver seam that the other GoDork crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes and records (`Query`, `PageRequest`, `ExtractionRecord`, `PageReport`)
//! - [`challenge`] - The `ChallengeSolver` boundary consumed by the scanner
//! - [`query`] - Loading queries from a literal argument or a file
//!
//! # Example
//!
//! ```rust
//! use godork_core::{load_queries, AppConfig, PageRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let queries = load_queries("site:example.com inurl:admin")?;
//!
//! for offset in config.harvest.offsets() {
//!     let request = PageRequest::new(queries[0].clone(), offset);
//!     assert!(request.page_number() >= 1);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod challenge;
pub mod config;
pub mod error;
pub mod query;
pub mod types;

// Re-export commonly used types
pub use challenge::{ChallengeOutcome, ChallengeSolver, UnavailableSolver};
pub use config::{
    AppConfig, ChallengeConfig, GeneralConfig, HarvestConfig, HttpConfig, ProviderConfig,
    ReportConfig,
};
pub use error::{ConfigError, ConfigResult, GodorkError, Result};
pub use query::load_queries;
pub use types::{DataOutput, ExtractionRecord, PageReport, PageRequest, Query};
