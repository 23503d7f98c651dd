//! Configuration management for GoDork.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/godork/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General application settings
    pub general: GeneralConfig,
    /// Search provider description
    pub provider: ProviderConfig,
    /// HTTP transport settings
    pub http: HttpConfig,
    /// Pagination and retry budgets
    pub harvest: HarvestConfig,
    /// Challenge solver settings
    pub challenge: ChallengeConfig,
    /// Report output settings
    pub report: ReportConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    /// Returns `ConfigError::NotFound` if the file is missing, or a parse error
    /// if its contents are not valid TOML.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `GODORK_PROXY`: HTTP proxy URL
    /// - `GODORK_HEADLESS`: Run the challenge browser headless (true/false)
    /// - `GODORK_DEBUG`: Verbose logging (true/false)
    /// - `GODORK_RETRIES`: Indeterminate retry cap
    /// - `GODORK_MAX_RETRIES`: Challenge attempt cap
    /// - `GODORK_CONCURRENCY`: Queries harvested concurrently
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// Values that fail to parse are ignored and the configured value is kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(proxy) = lookup("GODORK_PROXY") {
            let proxy = proxy.trim().to_string();
            self.http.proxy = if proxy.is_empty() { None } else { Some(proxy) };
            tracing::debug!("Override http.proxy from env");
        }

        if let Some(headless) = lookup("GODORK_HEADLESS").and_then(|v| v.parse().ok()) {
            self.challenge.headless = headless;
            tracing::debug!("Override challenge.headless from env: {}", headless);
        }

        if let Some(verbose) = lookup("GODORK_DEBUG").and_then(|v| v.parse().ok()) {
            self.general.debug = verbose;
            tracing::debug!("Override general.debug from env: {}", verbose);
        }

        if let Some(cap) = lookup("GODORK_RETRIES").and_then(|v| v.parse().ok()) {
            self.harvest.indeterminate_retry_cap = cap;
            tracing::debug!("Override harvest.indeterminate_retry_cap from env: {}", cap);
        }

        if let Some(cap) = lookup("GODORK_MAX_RETRIES").and_then(|v| v.parse().ok()) {
            self.harvest.challenge_attempt_cap = cap;
            tracing::debug!("Override harvest.challenge_attempt_cap from env: {}", cap);
        }

        if let Some(workers) = lookup("GODORK_CONCURRENCY").and_then(|v| v.parse().ok()) {
            self.harvest.concurrent_queries = workers;
            tracing::debug!("Override harvest.concurrent_queries from env: {}", workers);
        }
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.harvest.page_step == 0 {
            return Err(invalid("harvest.page_step", "must be greater than zero"));
        }
        if self.harvest.max_offset % self.harvest.page_step != 0 {
            return Err(invalid(
                "harvest.max_offset",
                format!("must be a multiple of page_step ({})", self.harvest.page_step),
            ));
        }
        if self.harvest.concurrent_queries == 0 {
            return Err(invalid("harvest.concurrent_queries", "must be at least 1"));
        }
        if self.http.timeout_secs == 0 {
            return Err(invalid("http.timeout_secs", "must be greater than zero"));
        }
        if let Some(proxy) = &self.http.proxy {
            let parsed = url::Url::parse(proxy)
                .map_err(|e| invalid("http.proxy", format!("not a valid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(invalid("http.proxy", "only http(s) proxies are supported"));
            }
        }
        if url::Url::parse(&self.provider.base_url).is_err() {
            return Err(invalid("provider.base_url", "not a valid URL"));
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/godork/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "godork", "godork").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Emit debug-level events (request URLs, status codes, redirect targets)
    pub debug: bool,
}

/// Description of the search provider being harvested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Search endpoint every page request is issued against
    pub base_url: String,
    /// Static `Referer` header value
    pub referer: String,
    /// Exact `<title>` of the blank placeholder page served instead of results
    pub results_marker: String,
    /// Path fragment of the anti-automation interstitial in `Location` headers
    pub block_path: String,
    /// Registrable domain of the provider; links to it or its subdomains are dropped
    pub domain: String,
    /// Headings that belong to the provider chrome rather than to results
    pub boilerplate_headings: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search".to_string(),
            referer: "https://www.google.com/".to_string(),
            results_marker: "Google Search".to_string(),
            block_path: "/sorry/index".to_string(),
            domain: "google.com".to_string(),
            boilerplate_headings: vec![
                "Google Search Console".to_string(),
                "Google Search".to_string(),
            ],
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// HTTP proxy URL; TLS certificate verification is disabled when set
    pub proxy: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl HttpConfig {
    /// Per-request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Intercepting proxies re-sign TLS, so verification is off whenever one is configured.
    #[must_use]
    pub fn accept_invalid_certs(&self) -> bool {
        self.proxy.is_some()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout_secs: 10,
        }
    }
}

/// Pagination and retry budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Same-request retries allowed for indeterminate responses per page
    pub indeterminate_retry_cap: u32,
    /// Solver attempts allowed per challenged page
    pub challenge_attempt_cap: u32,
    /// Offset increment between result pages
    pub page_step: u32,
    /// Last offset requested for a query (inclusive)
    pub max_offset: u32,
    /// Number of queries harvested concurrently
    pub concurrent_queries: usize,
}

impl HarvestConfig {
    /// Offsets visited for every query, in increasing order.
    pub fn offsets(&self) -> impl Iterator<Item = u32> {
        let step = usize::try_from(self.page_step.max(1)).unwrap_or(usize::MAX);
        (0..=self.max_offset).step_by(step)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            indeterminate_retry_cap: 40,
            challenge_attempt_cap: 2,
            page_step: 10,
            max_offset: 500,
            concurrent_queries: 1,
        }
    }
}

/// Challenge solver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Whether challenges are handed to the browser solver at all
    pub enabled: bool,
    /// Run the solver's browser without a visible window
    pub headless: bool,
    /// How long one solve attempt waits for the interstitial to clear
    pub solve_timeout_secs: u64,
    /// Interval between checks of the solver page
    pub poll_interval_ms: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            headless: true,
            solve_timeout_secs: 120,
            poll_interval_ms: 1000,
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Write the JSON report and text log to disk
    pub enabled: bool,
    /// Report root; defaults to `<temp dir>/godork/reports`
    pub directory: Option<PathBuf>,
}

impl ReportConfig {
    /// Directory under which `logs/` and `json/` are created.
    #[must_use]
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("godork").join("reports"))
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}
