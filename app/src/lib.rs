//! GoDork command-line application.
//!
//! Wires configuration, the HTTP session, the challenge solver and the report
//! sinks into a harvest run.

pub mod cli;

use anyhow::{Context, Result};
use cli::Cli;
use godork_browser::BrowserSolver;
use godork_core::{load_queries, AppConfig, ChallengeSolver, ReportConfig, UnavailableSolver};
use godork_report::{FileReporter, NullReporter, Reporter};
use godork_scanner::{FetchSession, HarvestOrchestrator, PageWalker, RunSummary};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const GOODBYE: &str = "We appreciate your use of our tool ;) Goodbye!";

/// Initialize tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured verbosity.
pub fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if debug {
        "warn,godork=debug"
    } else {
        "warn,godork=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Configuration from file, environment and flags, in increasing precedence.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load_with_env().context("failed to load config")?,
    };

    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Harvest every query named by `cli.dorks` until done or interrupted.
pub async fn run(cli: Cli, config: AppConfig) -> Result<RunSummary> {
    info!("Starting GoDork v{}", env!("CARGO_PKG_VERSION"));

    let queries = load_queries(&cli.dorks).context("failed to load queries")?;

    let (file_reporter, reporter) = build_reporter(&config.report).await?;

    let fetcher = Arc::new(
        FetchSession::new(&config.http, &config.provider).context("failed to build HTTP client")?,
    );
    let solver: Arc<dyn ChallengeSolver> = if config.challenge.enabled {
        Arc::new(BrowserSolver::new(&config.challenge, &config.provider))
    } else {
        Arc::new(UnavailableSolver)
    };

    let cancel = CancellationToken::new();
    let walker =
        PageWalker::new(fetcher, solver, reporter, &config).with_cancellation(cancel.clone());
    let orchestrator = HarvestOrchestrator::new(walker)
        .with_max_concurrent_queries(config.harvest.concurrent_queries);

    let interrupt = tokio::spawn(watch_interrupt(cancel));
    let summary = orchestrator.run(queries).await;
    interrupt.abort();

    if let Some(reporter) = &file_reporter {
        reporter.close().await;
        info!("Report saved to {}", reporter.json_path().display());
        info!("Log saved to {}", reporter.log_path().display());
    }

    info!(
        "Harvested {} links from {} queries",
        summary.total_links(),
        summary.outcomes.len()
    );
    if summary.was_cancelled() {
        info!("{GOODBYE}");
    }

    Ok(summary)
}

/// Report sink for the run, plus the file reporter to close when one is written.
async fn build_reporter(
    report: &ReportConfig,
) -> Result<(Option<Arc<FileReporter>>, Arc<dyn Reporter>)> {
    if !report.enabled {
        return Ok((None, Arc::new(NullReporter)));
    }

    let directory = report.resolved_directory();
    let file = FileReporter::create(&directory)
        .await
        .with_context(|| format!("failed to create report in {}", directory.display()))?;
    let file = Arc::new(file);
    let reporter: Arc<dyn Reporter> = Arc::clone(&file) as Arc<dyn Reporter>;
    Ok((Some(file), reporter))
}

async fn watch_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Interrupt received, stopping harvest");
        cancel.cancel();
    }
}
