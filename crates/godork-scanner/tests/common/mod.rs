#![allow(dead_code)]

use async_trait::async_trait;
use godork_core::{AppConfig, ChallengeOutcome, ChallengeSolver, Query};
use godork_report::MemoryReporter;
use godork_scanner::{PageFetcher, PageWalker, RawResponse, TransportError};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Reply = Result<RawResponse, TransportError>;

pub const BLOCK_URL: &str = "https://www.google.com/sorry/index?continue=https://www.google.com/search%3Fq%3Dinurl%253Aadmin%26start%3D0&q=EgQ";

/// Results page with `count` headings and wrapped links, unique per `tag`.
pub fn results_page(tag: &str, count: usize) -> String {
    let blocks: String = (0..count)
        .map(|i| {
            format!(
                r#"<div class="g"><a href="/url?q=https://{tag}-{i}.example.com/&amp;sa=U&amp;ved=2ahUKE"><h3>{tag} result {i}</h3></a></div>"#
            )
        })
        .collect();
    format!(
        r#"<html><head><title>{tag} - Google Search</title></head><body>{blocks}<a aria-label="Page 2">2</a><a aria-label="Page 5">5</a></body></html>"#
    )
}

pub fn ok(body: impl Into<String>) -> Reply {
    Ok(RawResponse::new(200, body))
}

pub fn placeholder() -> Reply {
    ok("<html><head><title>Google Search</title></head><body></body></html>")
}

pub fn empty_page() -> Reply {
    ok("<html><head><title>q - Google Search</title></head><body><p>did not match any documents</p></body></html>")
}

pub fn challenge() -> Reply {
    Ok(RawResponse::new(302, "").with_location(BLOCK_URL))
}

pub fn status(code: u16) -> Reply {
    Ok(RawResponse::new(code, "<html><body>error</body></html>"))
}

pub fn timeout() -> Reply {
    Err(TransportError::Timeout {
        url: "https://www.google.com/search".to_string(),
    })
}

/// Fetcher replaying scripted replies per (query, offset).
///
/// Unscripted requests get an empty results page, which ends the query.
#[derive(Default)]
pub struct ScriptedFetcher {
    script: Mutex<HashMap<(String, u32), VecDeque<Reply>>>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, query: &str, offset: u32, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry((query.to_string(), offset))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn offsets_for(&self, query: &str) -> Vec<u32> {
        self.requests()
            .into_iter()
            .filter(|(q, _)| q == query)
            .map(|(_, offset)| offset)
            .collect()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, _url: &str, params: &[(String, String)]) -> Reply {
        let param = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };
        let query = param("q");
        let offset: u32 = param("start").parse().unwrap();

        self.requests.lock().unwrap().push((query.clone(), offset));
        self.script
            .lock()
            .unwrap()
            .get_mut(&(query, offset))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(empty_page)
    }
}

/// Fetcher whose requests never complete.
pub struct StalledFetcher;

#[async_trait]
impl PageFetcher for StalledFetcher {
    async fn fetch(&self, _url: &str, _params: &[(String, String)]) -> Reply {
        std::future::pending().await
    }
}

/// Solver replaying scripted outcomes; unresolved once the script runs out.
#[derive(Default)]
pub struct ScriptedSolver {
    outcomes: Mutex<VecDeque<ChallengeOutcome>>,
    calls: Mutex<u32>,
}

impl ScriptedSolver {
    pub fn new(outcomes: Vec<ChallengeOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChallengeSolver for ScriptedSolver {
    async fn solve(&self, _challenge_url: &str) -> ChallengeOutcome {
        *self.calls.lock().unwrap() += 1;
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ChallengeOutcome::Unresolved {
                reason: "still blocked".to_string(),
            })
    }
}

/// Solver that never clears the challenge and records how many of its
/// solves overlapped.
#[derive(Default)]
pub struct TrackingSolver {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicU32,
}

impl TrackingSolver {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChallengeSolver for TrackingSolver {
    async fn solve(&self, _challenge_url: &str) -> ChallengeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        ChallengeOutcome::Unresolved {
            reason: "still blocked".to_string(),
        }
    }
}

/// Offsets 0..=30 with small retry budgets.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.harvest.max_offset = 30;
    config.harvest.indeterminate_retry_cap = 3;
    config.harvest.challenge_attempt_cap = 2;
    config
}

pub fn query(text: &str) -> Query {
    Query::new(text).unwrap()
}

pub struct Harness {
    pub fetcher: Arc<ScriptedFetcher>,
    pub solver: Arc<ScriptedSolver>,
    pub reporter: Arc<MemoryReporter>,
    pub walker: PageWalker,
}

pub fn harness(fetcher: ScriptedFetcher, solver: ScriptedSolver, config: &AppConfig) -> Harness {
    let fetcher = Arc::new(fetcher);
    let solver = Arc::new(solver);
    let reporter = Arc::new(MemoryReporter::new());
    let walker = PageWalker::new(fetcher.clone(), solver.clone(), reporter.clone(), config);
    Harness {
        fetcher,
        solver,
        reporter,
        walker,
    }
}
