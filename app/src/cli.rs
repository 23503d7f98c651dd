//! Command-line arguments.

use clap::Parser;
use godork_core::AppConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "godork")]
#[command(version, about = "Harvest search result titles and links for dork queries")]
pub struct Cli {
    /// A query, or a file with one query per line
    #[arg(short, long)]
    pub dorks: String,

    /// HTTP proxy for every request (disables TLS verification)
    #[arg(short, long)]
    pub proxy: Option<String>,

    /// Log request URLs, status codes and redirect targets
    #[arg(long)]
    pub debug: bool,

    /// Retries allowed for unexpected provider responses per page
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Attempts allowed for solving a challenge per page
    #[arg(short, long)]
    pub max_retries: Option<u32>,

    /// Show the challenge browser window
    #[arg(long)]
    pub no_headless: bool,

    /// Queries harvested at the same time
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the `logs/` and `json/` reports
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

impl Cli {
    /// Apply flags on top of file and environment configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(proxy) = &self.proxy {
            config.http.proxy = Some(proxy.clone());
        }
        if self.debug {
            config.general.debug = true;
        }
        if let Some(retries) = self.retries {
            config.harvest.indeterminate_retry_cap = retries;
        }
        if let Some(max_retries) = self.max_retries {
            config.harvest.challenge_attempt_cap = max_retries;
        }
        if self.no_headless {
            config.challenge.headless = false;
        }
        if let Some(concurrency) = self.concurrency {
            config.harvest.concurrent_queries = concurrency;
        }
        if let Some(dir) = &self.report_dir {
            config.report.directory = Some(dir.clone());
        }
    }
}
