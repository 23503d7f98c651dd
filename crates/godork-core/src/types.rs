//! Shared types used across the GoDork harvester.
//!
//! This module defines the query newtype, the page addressing scheme and the
//! records produced for every harvested results page.

use crate::error::GodorkError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of results the provider shows per page; offsets advance by this amount.
pub const RESULTS_PER_PAGE: u32 = 10;

/// A single search query ("dork"), possibly containing operator syntax such as `site:`.
///
/// Queries are never empty and never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query(String);

impl Query {
    /// Create a new `Query`.
    ///
    /// # Errors
    /// Returns error if the query is empty or whitespace only.
    pub fn new(query: impl Into<String>) -> Result<Self, GodorkError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(GodorkError::Validation(
                "query must not be empty".to_string(),
            ));
        }
        Ok(Self(query))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One results page of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Query being enumerated
    pub query: Query,
    /// Provider pagination offset (`start` parameter)
    pub offset: u32,
}

impl PageRequest {
    /// Create a request for `query` at `offset`.
    #[must_use]
    pub fn new(query: Query, offset: u32) -> Self {
        Self { query, offset }
    }

    /// 1-based page number for this offset.
    #[must_use]
    pub fn page_number(&self) -> u32 {
        page_number(self.offset)
    }
}

/// Convert a provider offset into a 1-based page number.
#[must_use]
pub fn page_number(offset: u32) -> u32 {
    offset / RESULTS_PER_PAGE + 1
}

/// One harvested (title, link) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Query that produced the record
    pub query: String,
    /// 1-based results page
    pub page_number: u32,
    /// Result heading
    pub title: String,
    /// Decoded target URL
    pub link: String,
    /// When the page was fetched
    pub timestamp_fetched: DateTime<Utc>,
}

/// Titles and links extracted from one page, as persisted in the JSON report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataOutput {
    /// Result headings, in page order
    pub title: Vec<String>,
    /// Decoded result links, in page order
    pub links: Vec<String>,
}

/// Everything reported for one successfully harvested page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    /// When the page was fetched
    pub timestamp: DateTime<Utc>,
    /// Query that produced the page
    pub query: String,
    /// 1-based results page
    pub page: u32,
    /// Byte length of the page body
    pub size_page: usize,
    /// Extracted titles and links
    pub data_output: DataOutput,
}

impl PageReport {
    /// Pair titles and links by index.
    ///
    /// When the sequences differ in length only the overlapping prefix is paired.
    #[must_use]
    pub fn records(&self) -> Vec<ExtractionRecord> {
        self.data_output
            .title
            .iter()
            .zip(&self.data_output.links)
            .map(|(title, link)| ExtractionRecord {
                query: self.query.clone(),
                page_number: self.page,
                title: title.clone(),
                link: link.clone(),
                timestamp_fetched: self.timestamp,
            })
            .collect()
    }
}
