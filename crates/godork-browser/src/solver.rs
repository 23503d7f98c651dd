use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use godork_core::{ChallengeConfig, ChallengeOutcome, ChallengeSolver, ProviderConfig};
use std::time::Duration;
use tokio::time::Instant;

/// Challenge solver that opens the interstitial in Chromium and waits for it
/// to clear, either on its own or by a person solving it in a visible window.
///
/// Every solve launches a fresh browser and closes it afterwards.
pub struct BrowserSolver {
    headless: bool,
    solve_timeout: Duration,
    poll_interval: Duration,
    block_path: String,
}

impl BrowserSolver {
    #[must_use]
    pub fn new(challenge: &ChallengeConfig, provider: &ProviderConfig) -> Self {
        Self {
            headless: challenge.headless,
            solve_timeout: Duration::from_secs(challenge.solve_timeout_secs),
            poll_interval: Duration::from_millis(challenge.poll_interval_ms.max(1)),
            block_path: provider.block_path.clone(),
        }
    }

    async fn launch(&self) -> Result<Browser> {
        let fingerprint = FingerprintConfig::randomized();
        let mut builder = fingerprint.configure(BrowserConfig::builder().no_sandbox());
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(browser)
    }

    async fn run(&self, challenge_url: &str) -> Result<(String, String)> {
        let mut browser = self.launch().await?;
        let result = self.wait_for_clearance(&browser, challenge_url).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Failed to close solver browser: {}", e);
        }
        result
    }

    async fn wait_for_clearance(
        &self,
        browser: &Browser,
        challenge_url: &str,
    ) -> Result<(String, String)> {
        let page = browser
            .new_page(challenge_url)
            .await
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;

        let deadline = Instant::now() + self.solve_timeout;
        loop {
            let current = page
                .url()
                .await
                .map_err(|e| BrowserError::NavigationError(e.to_string()))?;

            if let Some(current) = current.filter(|url| is_cleared(url, &self.block_path)) {
                let body = page
                    .content()
                    .await
                    .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
                return Ok((current, body));
            }

            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(self.solve_timeout.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl ChallengeSolver for BrowserSolver {
    async fn solve(&self, challenge_url: &str) -> ChallengeOutcome {
        tracing::debug!(headless = self.headless, "Opening challenge in browser");

        match self.run(challenge_url).await {
            Ok((final_url, body)) => ChallengeOutcome::Resolved { final_url, body },
            Err(e) => ChallengeOutcome::Unresolved {
                reason: e.to_string(),
            },
        }
    }
}

/// The browser has left the interstitial and landed on a real page.
fn is_cleared(current_url: &str, block_path: &str) -> bool {
    url::Url::parse(current_url).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && !url.path().starts_with(block_path)
    })
}
