//! GoDork Scanner - paginated search harvesting.
//!
//! This crate turns queries into extraction records:
//!
//! - [`fetch`] - pooled HTTP session behind the [`PageFetcher`] seam
//! - [`classifier`] - maps raw responses onto walker verdicts
//! - [`extractor`] - titles and links from results markup
//! - [`challenge`] - bounded, serialized escalation to a challenge solver
//! - [`walker`] - the per-query pagination state machine
//! - [`orchestrator`] - concurrent harvesting of many queries

pub mod challenge;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod orchestrator;
pub mod url_params;
pub mod walker;

pub use challenge::{ChallengeCoordinator, Resolution};
pub use classifier::{classify, Verdict};
pub use error::{Result, ScanError, TransportError};
pub use extractor::{last_page, Extraction, Extractor};
pub use fetch::{search_params, FetchSession, PageFetcher, RawResponse};
pub use orchestrator::{HarvestOrchestrator, RunSummary};
pub use walker::{PageOutcome, PageWalker, QueryOutcome, QueryStop, RetryState};
