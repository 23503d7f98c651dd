mod common;

use common::*;
use godork_core::{ChallengeOutcome, PageRequest};
use godork_report::LogLevel;
use godork_scanner::{PageOutcome, QueryStop, ScanError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_results_pair_into_records() {
    let fetcher = ScriptedFetcher::new().on("alpha", 0, ok(results_page("alpha", 3)));
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let outcome = h.walker.walk(&query("alpha")).await;

    assert_eq!(outcome.links_harvested, 3);
    assert_eq!(outcome.stop, QueryStop::NoData { page: 2 });

    let records = h.reporter.records();
    assert_eq!(records.len(), 3);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.title, format!("alpha result {i}"));
        assert_eq!(record.link, format!("https://alpha-{i}.example.com/"));
        assert_eq!(record.page_number, 1);
        assert_eq!(record.query, "alpha");
    }
    assert!(h.reporter.logged(LogLevel::Info, "Total known pages: 5"));
    assert!(h
        .reporter
        .logged(LogLevel::Info, "Found 3 title and 3 links on page 1 for alpha"));
}

#[tokio::test]
async fn test_result_mentioning_provider_keeps_its_link() {
    let body = concat!(
        r#"<html><head><title>tips - Google Search</title></head><body>"#,
        r#"<div class="g"><a href="/url?q=https://blog.example.com/tips&amp;sa=U&amp;ved=x"><h3>10 Google Search tricks</h3></a></div>"#,
        r#"<div class="g"><a href="/url?q=https://other.example.org/&amp;sa=U&amp;ved=x"><h3>Other result</h3></a></div>"#,
        r#"</body></html>"#
    );
    let fetcher = ScriptedFetcher::new().on("tips", 0, ok(body));
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let request = PageRequest::new(query("tips"), 0);
    let outcome = h.walker.walk_page(&request).await.unwrap();

    assert_eq!(outcome, PageOutcome::Harvested { links: 2 });
    let pairs: Vec<(String, String)> = h
        .reporter
        .records()
        .into_iter()
        .map(|r| (r.title, r.link))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (
                "10 Google Search tricks".to_string(),
                "https://blog.example.com/tips".to_string()
            ),
            (
                "Other result".to_string(),
                "https://other.example.org/".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_offsets_strictly_increase_until_exhausted() {
    let fetcher = ScriptedFetcher::new()
        .on("alpha", 0, ok(results_page("p1", 2)))
        .on("alpha", 10, ok(results_page("p2", 2)))
        .on("alpha", 20, status(503))
        .on("alpha", 30, ok(results_page("p4", 1)));
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let outcome = h.walker.walk(&query("alpha")).await;

    assert_eq!(outcome.stop, QueryStop::Exhausted);
    assert_eq!(outcome.pages_visited, 4);
    assert_eq!(outcome.links_harvested, 5);

    let offsets = h.fetcher.offsets_for("alpha");
    assert_eq!(offsets, vec![0, 10, 20, 30]);
    assert!(offsets.windows(2).all(|w| w[0] < w[1]));

    let pages: Vec<u32> = h.reporter.pages().iter().map(|p| p.page).collect();
    assert_eq!(pages, vec![1, 2, 4]);
}

#[tokio::test]
async fn test_placeholder_is_retried() {
    let fetcher = ScriptedFetcher::new()
        .on("alpha", 0, placeholder())
        .on("alpha", 0, placeholder())
        .on("alpha", 0, ok(results_page("alpha", 2)));
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let request = PageRequest::new(query("alpha"), 0);
    let outcome = h.walker.walk_page(&request).await.unwrap();

    assert_eq!(outcome, PageOutcome::Harvested { links: 2 });
    assert_eq!(h.fetcher.requests().len(), 3);
    assert!(h.reporter.logged(
        LogLevel::Warning,
        "Unexpected provider response for alpha on page 1. Retrying (request: 2)"
    ));

    let performing = h
        .reporter
        .logs()
        .into_iter()
        .filter(|(_, message)| message.starts_with("Performing an HTTP GET request"))
        .count();
    assert_eq!(performing, 1);
}

#[tokio::test]
async fn test_indeterminate_cap_aborts_on_cap_th_attempt() {
    let fetcher = ScriptedFetcher::new()
        .on("alpha", 0, placeholder())
        .on("alpha", 0, placeholder())
        .on("alpha", 0, placeholder())
        .on("alpha", 0, ok(results_page("alpha", 1)));
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let request = PageRequest::new(query("alpha"), 0);
    let err = h.walker.walk_page(&request).await.unwrap_err();

    assert!(matches!(
        err,
        ScanError::MaxIndeterminateRetries {
            page: 1,
            attempts: 3
        }
    ));
    assert_eq!(h.fetcher.requests().len(), 3);
}

#[tokio::test]
async fn test_indeterminate_abort_stops_query() {
    let mut config = test_config();
    config.harvest.indeterminate_retry_cap = 1;
    let fetcher = ScriptedFetcher::new()
        .on("alpha", 0, ok(results_page("alpha", 1)))
        .on("alpha", 10, placeholder());
    let h = harness(fetcher, ScriptedSolver::default(), &config);

    let outcome = h.walker.walk(&query("alpha")).await;

    assert!(matches!(outcome.stop, QueryStop::Aborted { page: 2, .. }));
    assert_eq!(h.fetcher.offsets_for("alpha"), vec![0, 10]);
    assert_eq!(h.reporter.records().len(), 1);
}

#[tokio::test]
async fn test_transport_errors_use_indeterminate_budget() {
    let fetcher = ScriptedFetcher::new()
        .on("alpha", 0, timeout())
        .on("alpha", 0, ok(results_page("alpha", 1)));
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let request = PageRequest::new(query("alpha"), 0);
    let outcome = h.walker.walk_page(&request).await.unwrap();

    assert_eq!(outcome, PageOutcome::Harvested { links: 1 });
    assert_eq!(h.solver.calls(), 0);
    assert!(h.reporter.logged(LogLevel::Debug, "timed out"));
}

#[tokio::test]
async fn test_unresolved_challenge_aborts_query() {
    let fetcher = ScriptedFetcher::new().on("alpha", 0, challenge());
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let outcome = h.walker.walk(&query("alpha")).await;

    assert!(matches!(outcome.stop, QueryStop::Aborted { page: 1, .. }));
    assert_eq!(h.solver.calls(), 2);
    assert_eq!(h.fetcher.requests().len(), 1);
    assert!(h.reporter.logged(
        LogLevel::Warning,
        "Requests were blocked due to provider-side protection"
    ));
    assert!(h
        .reporter
        .logged(LogLevel::Info, "Try using the `--no-headless` option"));
}

#[tokio::test]
async fn test_resolved_challenge_is_harvested_once() {
    let fetcher = ScriptedFetcher::new()
        .on("alpha", 0, challenge())
        .on("alpha", 10, ok(results_page("next", 1)));
    let solver = ScriptedSolver::new(vec![
        ChallengeOutcome::Unresolved {
            reason: "captcha still visible".to_string(),
        },
        ChallengeOutcome::Resolved {
            final_url: "https://www.google.com/search?q=alpha&start=0".to_string(),
            body: results_page("solved", 2),
        },
    ]);
    let h = harness(fetcher, solver, &test_config());

    let outcome = h.walker.walk(&query("alpha")).await;

    assert_eq!(h.solver.calls(), 2);
    assert_eq!(outcome.links_harvested, 3);
    assert_eq!(outcome.stop, QueryStop::NoData { page: 3 });
    // The resolved page is not fetched again; pagination resumes at the next offset
    assert_eq!(h.fetcher.offsets_for("alpha"), vec![0, 10, 20]);

    let titles: Vec<String> = h.reporter.records().into_iter().map(|r| r.title).collect();
    assert_eq!(
        titles,
        vec!["solved result 0", "solved result 1", "next result 0"]
    );
}

#[tokio::test]
async fn test_zero_challenge_cap_never_calls_solver() {
    let mut config = test_config();
    config.harvest.challenge_attempt_cap = 0;
    let fetcher = ScriptedFetcher::new().on("alpha", 0, challenge());
    let h = harness(fetcher, ScriptedSolver::default(), &config);

    let outcome = h.walker.walk(&query("alpha")).await;

    assert!(matches!(outcome.stop, QueryStop::Aborted { page: 1, .. }));
    assert_eq!(h.solver.calls(), 0);
}

#[tokio::test]
async fn test_no_data_keeps_earlier_pages() {
    let fetcher = ScriptedFetcher::new()
        .on("alpha", 0, ok(results_page("alpha", 2)))
        .on("alpha", 10, empty_page());
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let outcome = h.walker.walk(&query("alpha")).await;

    assert_eq!(outcome.stop, QueryStop::NoData { page: 2 });
    assert_eq!(outcome.pages_visited, 1);
    assert_eq!(h.reporter.pages().len(), 1);
    assert_eq!(h.reporter.records().len(), 2);
    assert!(h
        .reporter
        .logged(LogLevel::Info, "No data can be collected on page 2"));
}

#[tokio::test]
async fn test_client_error_advances_without_retry() {
    let fetcher = ScriptedFetcher::new()
        .on("alpha", 0, status(404))
        .on("alpha", 10, ok(results_page("alpha", 1)));
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let outcome = h.walker.walk(&query("alpha")).await;

    assert_eq!(h.fetcher.offsets_for("alpha"), vec![0, 10, 20]);
    assert_eq!(outcome.pages_visited, 2);
    assert_eq!(outcome.links_harvested, 1);
    assert!(h
        .reporter
        .logged(LogLevel::Error, "Client error (status 404) on page 1 for alpha"));
    assert!(h
        .reporter
        .logged(LogLevel::Info, "Performing an HTTP GET request on page 1 for alpha"));
}

#[tokio::test]
async fn test_titles_without_links_record_nothing() {
    let body = r#"<html><body><h3>Only a heading</h3></body></html>"#;
    let fetcher = ScriptedFetcher::new().on("alpha", 0, ok(body));
    let h = harness(fetcher, ScriptedSolver::default(), &test_config());

    let request = PageRequest::new(query("alpha"), 0);
    let outcome = h.walker.walk_page(&request).await.unwrap();

    assert_eq!(outcome, PageOutcome::Harvested { links: 0 });
    assert!(h.reporter.pages().is_empty());
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    let h = harness(ScriptedFetcher::new(), ScriptedSolver::default(), &test_config());
    let walker = h.walker.with_cancellation(token.clone());
    token.cancel();

    let outcome = walker.walk(&query("alpha")).await;

    assert_eq!(outcome.stop, QueryStop::Cancelled);
    assert!(h.fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_cancellation_abandons_in_flight_fetch() {
    let token = CancellationToken::new();
    let reporter = std::sync::Arc::new(godork_report::MemoryReporter::new());
    let walker = godork_scanner::PageWalker::new(
        std::sync::Arc::new(StalledFetcher),
        std::sync::Arc::new(ScriptedSolver::default()),
        reporter,
        &test_config(),
    )
    .with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), walker.walk(&query("alpha")))
        .await
        .expect("walk should stop once cancelled");

    canceller.await.unwrap();
    assert_eq!(outcome.stop, QueryStop::Cancelled);
    assert_eq!(outcome.pages_visited, 0);
}
