//! Report sinks for harvest runs.
//!
//! A [`Reporter`] receives every harvested page and a parallel stream of log
//! events. Sinks are append-only and never fail the caller: persistence errors
//! are downgraded to `tracing` events.

pub mod error;
pub mod file;
pub mod memory;
pub mod reporter;

pub use error::{ReportError, Result};
pub use file::FileReporter;
pub use memory::MemoryReporter;
pub use reporter::{emit, LogLevel, NullReporter, Reporter};
