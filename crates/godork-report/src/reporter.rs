//! The `Reporter` sink contract.

use godork_core::PageReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a report log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Progress and informational stops
    Info,
    /// Failed fetches, solver failures
    Error,
    /// Request URLs, status codes, redirect targets
    Debug,
    /// Blocks, retries, aborted queries
    Warning,
}

impl LogLevel {
    /// Label written to the text log.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Debug => "DEBUG",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Append-only sink for harvested pages and log events.
///
/// Implementations must be cheap to call from the fetch path and must swallow
/// their own persistence failures.
pub trait Reporter: Send + Sync {
    /// Append one harvested page (its ordered extraction records).
    fn record(&self, page: &PageReport);

    /// Append one log line.
    fn log(&self, level: LogLevel, message: &str);
}

/// Reporter that drops everything. Used when report files are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn record(&self, _page: &PageReport) {}

    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Send `message` to both the tracing subscriber and the reporter's log stream.
pub fn emit(reporter: &dyn Reporter, level: LogLevel, message: &str) {
    match level {
        LogLevel::Info => tracing::info!("{message}"),
        LogLevel::Error => tracing::error!("{message}"),
        LogLevel::Debug => tracing::debug!("{message}"),
        LogLevel::Warning => tracing::warn!("{message}"),
    }
    reporter.log(level, message);
}
