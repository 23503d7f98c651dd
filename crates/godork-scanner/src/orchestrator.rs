//! Harvest orchestration across queries.

use crate::walker::{PageWalker, QueryOutcome, QueryStop};
use futures::stream::{FuturesUnordered, StreamExt};
use godork_core::Query;

/// Outcome of a whole run, in query input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<QueryOutcome>,
}

impl RunSummary {
    /// Paired (title, link) records harvested across all queries.
    #[must_use]
    pub fn total_links(&self) -> usize {
        self.outcomes.iter().map(|o| o.links_harvested).sum()
    }

    /// Queries stopped by an exhausted retry budget.
    #[must_use]
    pub fn aborted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.stop, QueryStop::Aborted { .. }))
            .count()
    }

    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.stop == QueryStop::Cancelled)
    }
}

/// Runs the page walker over every query.
pub struct HarvestOrchestrator {
    walker: PageWalker,
    max_concurrent_queries: usize,
}

impl HarvestOrchestrator {
    #[must_use]
    pub fn new(walker: PageWalker) -> Self {
        Self {
            walker,
            max_concurrent_queries: 1,
        }
    }

    /// Set maximum number of queries harvested at once.
    #[must_use]
    pub fn with_max_concurrent_queries(mut self, max: usize) -> Self {
        self.max_concurrent_queries = max.max(1);
        self
    }

    /// Harvest all `queries`.
    ///
    /// Queries run concurrently up to `max_concurrent_queries`; a failing query
    /// never stops the others. Outcomes are returned in input order.
    pub async fn run(&self, queries: Vec<Query>) -> RunSummary {
        tracing::info!(
            queries = queries.len(),
            concurrency = self.max_concurrent_queries,
            "Starting harvest"
        );

        let walker = &self.walker;
        let mut futures = FuturesUnordered::new();
        let mut outcomes = Vec::with_capacity(queries.len());

        for (index, query) in queries.into_iter().enumerate() {
            futures.push(async move { (index, walker.walk(&query).await) });

            // Respect concurrency limit
            while futures.len() >= self.max_concurrent_queries {
                if let Some(outcome) = futures.next().await {
                    outcomes.push(outcome);
                }
            }
        }

        // Collect remaining outcomes
        while let Some(outcome) = futures.next().await {
            outcomes.push(outcome);
        }

        outcomes.sort_by_key(|(index, _)| *index);
        let summary = RunSummary {
            outcomes: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
        };

        tracing::info!(
            links = summary.total_links(),
            aborted = summary.aborted(),
            "Harvest finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(query: &str, links: usize, stop: QueryStop) -> QueryOutcome {
        QueryOutcome {
            query: Query::new(query).expect("valid query"),
            pages_visited: 1,
            links_harvested: links,
            stop,
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = RunSummary {
            outcomes: vec![
                outcome("a", 3, QueryStop::Exhausted),
                outcome(
                    "b",
                    0,
                    QueryStop::Aborted {
                        page: 1,
                        reason: "blocked".to_string(),
                    },
                ),
                outcome("c", 7, QueryStop::NoData { page: 2 }),
            ],
        };

        assert_eq!(summary.total_links(), 10);
        assert_eq!(summary.aborted(), 1);
        assert!(!summary.was_cancelled());
    }
}
