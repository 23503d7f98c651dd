//! Challenge escalation.
//!
//! When the provider redirects to its block page, the coordinator hands the
//! interstitial URL to the configured [`ChallengeSolver`] a bounded number of
//! times. Solves are serialized process-wide: the solver usually drives an
//! expensive browser that cannot be shared.

use crate::error::{Result, ScanError};
use crate::url_params;
use godork_core::{ChallengeOutcome, ChallengeSolver, PageRequest};
use godork_report::{emit, LogLevel, Reporter};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A cleared challenge: the page the solver ended up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub final_url: String,
    pub body: String,
    /// Solver calls it took, including the successful one.
    pub attempts: u32,
}

/// Bounded, serialized access to the challenge solver.
pub struct ChallengeCoordinator {
    solver: Arc<dyn ChallengeSolver>,
    reporter: Arc<dyn Reporter>,
    attempt_cap: u32,
    gate: Mutex<()>,
}

impl ChallengeCoordinator {
    #[must_use]
    pub fn new(
        solver: Arc<dyn ChallengeSolver>,
        reporter: Arc<dyn Reporter>,
        attempt_cap: u32,
    ) -> Self {
        Self {
            solver,
            reporter,
            attempt_cap,
            gate: Mutex::new(()),
        }
    }

    /// One solver call. Waits for any other in-flight solve to finish first.
    pub async fn attempt(&self, challenge_url: &str, attempt: u32) -> ChallengeOutcome {
        let _guard = self.gate.lock().await;
        tracing::debug!(attempt, url = challenge_url, "solver acquired");
        emit(
            self.reporter.as_ref(),
            LogLevel::Info,
            "Initiating challenge bypass...",
        );
        self.solver.solve(challenge_url).await
    }

    /// Call the solver until it resolves the challenge or the attempt cap is hit.
    ///
    /// # Errors
    /// Returns `ScanError::MaxChallengeRetries` once `attempt_cap` solves have failed.
    pub async fn resolve(&self, request: &PageRequest, challenge_url: &str) -> Result<Resolution> {
        let page = request.page_number();
        let query = &request.query;
        let mut last_reason = "no solve attempt was allowed".to_string();

        for attempt in 0..self.attempt_cap {
            match self.attempt(challenge_url, attempt).await {
                ChallengeOutcome::Resolved { final_url, body } => {
                    self.log_resumption(request, &final_url);
                    return Ok(Resolution {
                        final_url,
                        body,
                        attempts: attempt + 1,
                    });
                }
                ChallengeOutcome::Unresolved { reason } => {
                    emit(
                        self.reporter.as_ref(),
                        LogLevel::Error,
                        &format!(
                            "Failed to bypass challenge for {query} on page {page} (attempt: {}). reason: {reason}",
                            attempt + 1
                        ),
                    );
                    if attempt + 1 < self.attempt_cap {
                        emit(
                            self.reporter.as_ref(),
                            LogLevel::Info,
                            &format!(
                                "Retrying bypass of challenge (attempt: {}) on page {page} for {query}",
                                attempt + 1
                            ),
                        );
                    }
                    last_reason = reason;
                }
            }
        }

        Err(ScanError::MaxChallengeRetries {
            page,
            attempts: self.attempt_cap,
            reason: last_reason,
        })
    }

    fn log_resumption(&self, request: &PageRequest, final_url: &str) {
        let resumed_query = url_params::search_query(final_url);
        let resumed_page = godork_core::types::page_number(url_params::search_offset(final_url));

        emit(
            self.reporter.as_ref(),
            LogLevel::Info,
            &format!("Challenge cleared; resuming on page {resumed_page}"),
        );
        tracing::debug!(final_url, "challenge resolved");

        if let Some(resumed) = resumed_query {
            if resumed != request.query.as_str() {
                emit(
                    self.reporter.as_ref(),
                    LogLevel::Warning,
                    &format!(
                        "Resolved page belongs to query {resumed:?}, expected {:?}",
                        request.query.as_str()
                    ),
                );
            }
        }
    }
}
