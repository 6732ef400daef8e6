//! Sitemap-Submit main entry point
//!
//! This is the command-line interface for submitting sitemap URLs to
//! search-engine indexing APIs.

use anyhow::Context;
use clap::Parser;
use sitemap_submit::config::{self, Config};
use sitemap_submit::output::{print_history, print_summary, totals};
use sitemap_submit::runner::{history_overview, reset_history, Coordinator, RunOptions};
use sitemap_submit::{Platform, TracingReporter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Sitemap-Submit: push new sitemap URLs to Baidu, Bing and Google
///
/// Resolves each configured site's sitemap, skips URLs that were already
/// accepted, and submits the rest within each platform's daily quota.
#[derive(Parser, Debug)]
#[command(name = "sitemap-submit")]
#[command(version = "1.0.0")]
#[command(about = "Submit sitemap URLs to search-engine indexing APIs", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file or a directory of them
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resolve sitemaps and show what would be submitted without submitting
    #[arg(long, conflicts_with_all = ["stats", "reset"])]
    dry_run: bool,

    /// Show submission history counts and exit
    #[arg(long, conflicts_with_all = ["dry_run", "reset"])]
    stats: bool,

    /// Delete submission history (of one domain, or of every site) and exit
    #[arg(
        long,
        value_name = "DOMAIN",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "",
        conflicts_with_all = ["dry_run", "stats"]
    )]
    reset: Option<String>,

    /// Only submit to these platforms (baidu, bing, google)
    #[arg(long, value_delimiter = ',')]
    platform: Vec<Platform>,

    /// Ignore cached sitemaps and fetch them again
    #[arg(long)]
    refresh: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = config::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let _log_guard = setup_logging(
        cli.verbose,
        cli.quiet,
        &config.settings.log_level,
        &config.settings.data_dir,
    );
    tracing::info!(
        "Loaded {} site(s) from {}",
        config.sites.len(),
        cli.config.display()
    );

    if cli.stats {
        handle_stats(&config)?;
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(domain) = cli.reset.as_deref() {
        handle_reset(&config, domain)?;
        return Ok(ExitCode::SUCCESS);
    }

    let options = RunOptions {
        dry_run: cli.dry_run,
        refresh: cli.refresh,
        platforms: (!cli.platform.is_empty()).then_some(cli.platform),
    };
    handle_run(config, options).await
}

/// Sets up the logging/tracing subscriber
///
/// Console output follows the verbosity flags; without them the configured
/// level applies to this crate and everything else logs warnings only.
/// Every run also appends to `<data-dir>/logs/YYYY-MM-DD.log`. The returned
/// guard flushes that file when dropped.
fn setup_logging(verbose: u8, quiet: bool, level: &str, data_dir: &Path) -> Option<WorkerGuard> {
    let configured = || {
        EnvFilter::try_new(format!("sitemap_submit={},warn", level))
            .unwrap_or_else(|_| EnvFilter::new("sitemap_submit=info,warn"))
    };

    let console_filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => configured(),
            1 => EnvFilter::new("sitemap_submit=debug,info"),
            2 => EnvFilter::new("sitemap_submit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };
    let file_filter = if verbose > 0 {
        EnvFilter::new("sitemap_submit=debug,warn")
    } else {
        configured()
    };

    let log_dir = data_dir.join("logs");
    let (file_layer, guard, file_error) = match daily_log_file(&log_dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("Logging to console only, cannot open {}: {}", log_dir.display(), e);
    }
    guard
}

/// Appender writing to `<dir>/YYYY-MM-DD.log`, rolled over daily
fn daily_log_file(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_suffix("log")
        .build(dir)
}

/// Handles --stats: prints history counts per site and platform
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Data directory: {}\n", config.settings.data_dir.display());
    let counts = history_overview(config).context("Failed to read submission history")?;
    print_history(&counts);
    Ok(())
}

/// Handles --reset: deletes history files
fn handle_reset(config: &Config, domain: &str) -> anyhow::Result<()> {
    let domain = (!domain.is_empty()).then_some(domain);
    let reset = reset_history(config, domain).context("Failed to reset submission history")?;
    for domain in reset {
        println!("✓ Reset history for {}", domain);
    }
    Ok(())
}

/// Handles the main submission run
async fn handle_run(config: Config, options: RunOptions) -> anyhow::Result<ExitCode> {
    if options.dry_run {
        tracing::info!("Dry run: nothing will be submitted");
    }

    let coordinator = Coordinator::new(config, Arc::new(TracingReporter))
        .context("Failed to initialise submission run")?;
    let stats = coordinator.run(&options).await;

    if options.dry_run {
        println!("=== Dry Run (Sent = would be sent) ===\n");
    }
    print_summary(&stats);

    if totals(&stats).errors > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
