use crate::reporter::{LogLevel, Reporter};
use godork_core::{ExtractionRecord, PageReport};
use std::sync::{Mutex, PoisonError};

/// Reporter that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pages: Mutex<Vec<PageReport>>,
    logs: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages recorded so far, in arrival order.
    pub fn pages(&self) -> Vec<PageReport> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Flattened extraction records, in arrival order.
    pub fn records(&self) -> Vec<ExtractionRecord> {
        self.pages().iter().flat_map(PageReport::records).collect()
    }

    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any log line at `level` contains `needle`.
    pub fn logged(&self, level: LogLevel, needle: &str) -> bool {
        self.logs()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn record(&self, page: &PageReport) {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(page.clone());
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}
