//! Per-query pagination state machine.
//!
//! For every offset the walker sends one request, classifies the response and
//! either harvests it, retries it, escalates it to the challenge coordinator
//! or skips it. Query-level failures stop only the current query.

use crate::challenge::{ChallengeCoordinator, Resolution};
use crate::classifier::{classify, Verdict};
use crate::error::{Result, ScanError, TransportError};
use crate::extractor::{last_page, Extractor};
use crate::fetch::{search_params, PageFetcher, RawResponse};
use chrono::Utc;
use godork_core::{
    AppConfig, ChallengeSolver, DataOutput, HarvestConfig, PageReport, PageRequest,
    ProviderConfig, Query,
};
use godork_report::{emit, LogLevel, Reporter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Indeterminate-retry counter for one page request.
///
/// A fresh value is created per page; each retry produces a new value rather
/// than mutating the old one. Challenge attempts are counted by the
/// [`ChallengeCoordinator`] within a single resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    pub indeterminate_retries: u32,
}

impl RetryState {
    #[must_use]
    pub fn after_indeterminate(self) -> Self {
        Self {
            indeterminate_retries: self.indeterminate_retries + 1,
        }
    }
}

/// How a single page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Extracted and reported; `links` paired records.
    Harvested { links: usize },
    /// Client or server error; pagination moves on.
    Skipped { status: u16 },
}

/// Why a query stopped paginating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStop {
    /// Every offset up to the configured maximum was visited.
    Exhausted,
    /// A results page had no headings.
    NoData { page: u32 },
    /// A retry budget ran out.
    Aborted { page: u32, reason: String },
    /// The run was interrupted.
    Cancelled,
}

/// Result of walking one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query: Query,
    pub pages_visited: u32,
    pub links_harvested: usize,
    pub stop: QueryStop,
}

/// Drives the offset loop for one query at a time.
///
/// A walker holds no per-query state and can serve several queries
/// concurrently.
pub struct PageWalker {
    fetcher: Arc<dyn PageFetcher>,
    coordinator: ChallengeCoordinator,
    reporter: Arc<dyn Reporter>,
    extractor: Extractor,
    provider: ProviderConfig,
    harvest: HarvestConfig,
    cancel: CancellationToken,
}

impl PageWalker {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        solver: Arc<dyn ChallengeSolver>,
        reporter: Arc<dyn Reporter>,
        config: &AppConfig,
    ) -> Self {
        Self {
            fetcher,
            coordinator: ChallengeCoordinator::new(
                solver,
                Arc::clone(&reporter),
                config.harvest.challenge_attempt_cap,
            ),
            reporter,
            extractor: Extractor::new(&config.provider),
            provider: config.provider.clone(),
            harvest: config.harvest.clone(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to stop the walk from outside.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Walk every configured offset of `query`, in increasing order.
    pub async fn walk(&self, query: &Query) -> QueryOutcome {
        let mut outcome = QueryOutcome {
            query: query.clone(),
            pages_visited: 0,
            links_harvested: 0,
            stop: QueryStop::Exhausted,
        };

        if self.cancel.is_cancelled() {
            outcome.stop = QueryStop::Cancelled;
            return outcome;
        }

        emit(
            self.reporter.as_ref(),
            LogLevel::Info,
            &format!("Starting enumeration for {query}"),
        );

        for offset in self.harvest.offsets() {
            let request = PageRequest::new(query.clone(), offset);
            let page = request.page_number();

            match self.walk_page(&request).await {
                Ok(PageOutcome::Harvested { links }) => {
                    outcome.pages_visited += 1;
                    outcome.links_harvested += links;
                }
                Ok(PageOutcome::Skipped { .. }) => outcome.pages_visited += 1,
                Err(ScanError::NoData { page }) => {
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Info,
                        &format!("{} for {query}", ScanError::NoData { page }),
                    );
                    outcome.stop = QueryStop::NoData { page };
                    break;
                }
                Err(ScanError::Cancelled) => {
                    tracing::info!(query = %query, page, "Enumeration cancelled");
                    outcome.stop = QueryStop::Cancelled;
                    break;
                }
                Err(err) => {
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Error,
                        &format!("{err} for {query}"),
                    );
                    if matches!(err, ScanError::MaxChallengeRetries { .. }) {
                        emit(
                            self.reporter.as_ref(),
                            LogLevel::Info,
                            "Try using the `--no-headless` option",
                        );
                    }
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Warning,
                        &format!("Skipping query {query}"),
                    );
                    outcome.stop = QueryStop::Aborted {
                        page,
                        reason: err.to_string(),
                    };
                    break;
                }
            }
        }

        tracing::debug!(
            query = %query,
            pages = outcome.pages_visited,
            links = outcome.links_harvested,
            stop = ?outcome.stop,
            "Query finished"
        );
        outcome
    }

    /// Fetch one page until it resolves to a harvest, a skip or a query-level error.
    pub async fn walk_page(&self, request: &PageRequest) -> Result<PageOutcome> {
        let page = request.page_number();
        let query = &request.query;
        let mut state = RetryState::default();

        emit(
            self.reporter.as_ref(),
            LogLevel::Info,
            &format!("Performing an HTTP GET request on page {page} for {query}"),
        );

        loop {
            let response = match self.send(request).await? {
                Ok(response) => response,
                Err(err) => {
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Debug,
                        &format!("{err} ({query}, page {page})"),
                    );
                    state = self.register_indeterminate(request, state)?;
                    continue;
                }
            };

            emit(
                self.reporter.as_ref(),
                LogLevel::Debug,
                &format!(
                    "Status code {} on page {page} for {query} ({})",
                    response.status, response.final_url
                ),
            );

            match classify(&response, &self.provider) {
                Verdict::Success => return self.harvest(request, &response.body),
                Verdict::Indeterminate => {
                    state = self.register_indeterminate(request, state)?;
                }
                Verdict::Challenged { redirect_url } => {
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Warning,
                        &format!(
                            "Requests were blocked due to provider-side protection ({query}, page {page})"
                        ),
                    );
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Debug,
                        &format!("Redirect location: {redirect_url}"),
                    );

                    let resolution = self.solve(request, &redirect_url).await?;
                    tracing::debug!(
                        query = %query,
                        page,
                        attempts = resolution.attempts,
                        "Harvesting resolved page"
                    );
                    return self.harvest(request, &resolution.body);
                }
                Verdict::ClientError { status } => {
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Error,
                        &format!("Client error (status {status}) on page {page} for {query}"),
                    );
                    return Ok(PageOutcome::Skipped { status });
                }
                Verdict::ServerError { status } => {
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Error,
                        &format!("Server error (status {status}) on page {page} for {query}"),
                    );
                    return Ok(PageOutcome::Skipped { status });
                }
            }
        }
    }

    /// One fetch, abandoned as soon as the run is cancelled.
    async fn send(
        &self,
        request: &PageRequest,
    ) -> Result<std::result::Result<RawResponse, TransportError>> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let params = search_params(request);
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ScanError::Cancelled),
            response = self.fetcher.fetch(&self.provider.base_url, &params) => Ok(response),
        }
    }

    async fn solve(&self, request: &PageRequest, challenge_url: &str) -> Result<Resolution> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ScanError::Cancelled),
            resolution = self.coordinator.resolve(request, challenge_url) => resolution,
        }
    }

    fn register_indeterminate(
        &self,
        request: &PageRequest,
        state: RetryState,
    ) -> Result<RetryState> {
        let page = request.page_number();
        let next = state.after_indeterminate();
        if next.indeterminate_retries >= self.harvest.indeterminate_retry_cap {
            return Err(ScanError::MaxIndeterminateRetries {
                page,
                attempts: next.indeterminate_retries,
            });
        }

        emit(
            self.reporter.as_ref(),
            LogLevel::Warning,
            &format!(
                "Unexpected provider response for {} on page {page}. Retrying (request: {})",
                request.query, next.indeterminate_retries
            ),
        );
        Ok(next)
    }

    fn harvest(&self, request: &PageRequest, body: &str) -> Result<PageOutcome> {
        let page = request.page_number();
        let extraction = self.extractor.extract(body);

        if let Some(total) = last_page(body) {
            emit(
                self.reporter.as_ref(),
                LogLevel::Info,
                &format!("Total known pages: {total}"),
            );
        }

        if extraction.titles.is_empty() {
            return Err(ScanError::NoData { page });
        }

        if extraction.links.is_empty() {
            emit(
                self.reporter.as_ref(),
                LogLevel::Info,
                &format!("No links found on page {page} for {}", request.query),
            );
            return Ok(PageOutcome::Harvested { links: 0 });
        }

        emit(
            self.reporter.as_ref(),
            LogLevel::Info,
            &format!(
                "Found {} title and {} links on page {page} for {}",
                extraction.titles.len(),
                extraction.links.len(),
                request.query
            ),
        );

        let report = PageReport {
            timestamp: Utc::now(),
            query: request.query.as_str().to_string(),
            page,
            size_page: body.len(),
            data_output: DataOutput {
                title: extraction.titles,
                links: extraction.links,
            },
        };

        let records = report.records();
        for record in &records {
            tracing::info!(target: "godork::results", "{} [{}]", record.title, record.link);
        }
        self.reporter.record(&report);

        Ok(PageOutcome::Harvested {
            links: records.len(),
        })
    }
}
