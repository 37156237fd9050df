//! Sumi-Sweep main entry point
//!
//! This is the command-line interface for the Sumi-Sweep domain crawler.

use clap::Parser;
use std::path::PathBuf;
use sumi_sweep::config::{load_config_with_hash, validate, Config};
use sumi_sweep::output::print_report;
use sumi_sweep::{normalize_url, Algorithm, CrawlEngine};
use tracing_subscriber::EnvFilter;

/// Sumi-Sweep: a polite single-domain crawler
///
/// Sumi-Sweep crawls every page reachable from a start URL within its own
/// host, respecting robots.txt, and reports the links found on each page.
#[derive(Parser, Debug)]
#[command(name = "sumi-sweep")]
#[command(version)]
#[command(about = "A polite single-domain crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Traversal algorithm: bfs, dfs, ucs or incremental
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    /// Stop launching fetches after this many seconds
    #[arg(long, value_name = "SECS")]
    max_duration: Option<u64>,

    /// Stop launching fetches after this many pages
    #[arg(long, value_name = "PAGES")]
    max_pages: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(&cli)?;
    apply_overrides(&mut config, &cli);
    validate(&config)?;

    let algorithm = cli.algorithm.unwrap_or(config.crawler.algorithm);

    if cli.dry_run {
        handle_dry_run(&config, algorithm, &cli.start_url)?;
    } else {
        handle_crawl(config, algorithm, &cli.start_url, cli.json).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sweep=info,warn"),
            1 => EnvFilter::new("sumi_sweep=debug,info"),
            2 => EnvFilter::new("sumi_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = &cli.config else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Command-line limits take precedence over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(secs) = cli.max_duration {
        config.crawler.max_duration_secs = Some(secs);
    }
    if let Some(pages) = cli.max_pages {
        config.crawler.max_pages = Some(pages);
    }
}

/// Handles the --dry-run mode: validates inputs and shows what would be crawled
fn handle_dry_run(
    config: &Config,
    algorithm: Algorithm,
    start_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = normalize_url(start_url)?;

    println!("=== Sumi-Sweep Dry Run ===\n");
    println!("Start URL: {}", start);
    println!("Algorithm: {}", algorithm);

    println!("\nCrawler Configuration:");
    println!("  Concurrency limit: {}", config.crawler.concurrency_limit);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Max depth: {}", display_or(config.crawler.max_depth, "unbounded"));
    println!(
        "  Revisit interval: {}",
        display_or(config.crawler.revisit_interval_secs.map(|s| format!("{}s", s)), "none")
    );
    println!(
        "  Max duration: {}",
        display_or(config.crawler.max_duration_secs.map(|s| format!("{}s", s)), "none")
    );
    println!("  Max pages: {}", display_or(config.crawler.max_pages, "none"));

    println!("\nUser Agents ({}, rotate: {}):", config.user_agent.agents.len(), config.user_agent.rotate);
    for agent in &config.user_agent.agents {
        println!("  - {}", agent);
    }

    println!("\nFetch:");
    println!("  Timeout: {}ms", config.fetch.request_timeout_ms);
    println!(
        "  Retry attempts: {} (backoff {}ms)",
        config.fetch.retry_attempts, config.fetch.retry_backoff_ms
    );
    println!("  Redirect codes: {:?}", config.fetch.redirect_status_codes);
    println!("  Blocked content types: {:?}", config.fetch.blocked_content_types);

    println!("\n✓ Configuration is valid");
    Ok(())
}

fn display_or<T: ToString>(value: Option<T>, fallback: &str) -> String {
    value.map_or_else(|| fallback.to_string(), |v| v.to_string())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    algorithm: Algorithm,
    start_url: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = CrawlEngine::new(config, algorithm);

    // Ctrl-C stops launching new fetches and lets in-flight ones drain
    let stop = engine.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight fetches");
            stop.stop();
        }
    });

    match engine.run(start_url).await {
        Ok(report) => {
            tracing::info!("Crawl completed ({})", report.stop_reason.as_str());
            print_report(&report, json)?;
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
