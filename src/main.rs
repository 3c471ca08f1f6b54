//! Site-Harvest main entry point
//!
//! This is the command-line interface for discovering and fetching the pages
//! of a single site.

use anyhow::{Context, Result};
use clap::Parser;
use site_harvest::config::{load_config_with_hash, Config};
use site_harvest::discovery::Discoverer;
use site_harvest::session::{print_summary, CrawlSession, HttpPageFetcher};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Harvest: URL discovery and page retrieval
///
/// Site-Harvest finds the pages of a site through its sitemaps, the sitemap
/// declared in robots.txt, or by scraping links from the home page, then
/// fetches every discovered page and writes a JSON crawl report.
#[derive(Parser, Debug)]
#[command(name = "site-harvest")]
#[command(version)]
#[command(about = "URL discovery and page retrieval for a single site", long_about = None)]
struct Cli {
    /// Base URL of the site, e.g. https://example.edu
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the discovered URLs and exit without fetching them
    #[arg(long)]
    discover_only: bool,

    /// Write the crawl report here instead of the configured path
    #[arg(short, long, value_name = "PATH", conflicts_with = "discover_only")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_ref())?;

    let discoverer = Discoverer::new(&config).context("Failed to build HTTP client")?;
    let discovery = discoverer.discover(&cli.base_url).await;

    if cli.discover_only {
        for url in &discovery.urls {
            println!("{}", url);
        }
        tracing::info!(
            "{} URLs discovered via {}",
            discovery.urls.len(),
            discovery.source
        );
        return Ok(());
    }

    if discovery.is_empty() {
        tracing::warn!("Nothing to crawl for {}", cli.base_url);
    }

    handle_crawl(&config, &discovery.urls, cli.output).await
}

/// Loads the configuration file, or the defaults when none is given
fn load(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_harvest=info,warn"),
            1 => EnvFilter::new("site_harvest=debug,info"),
            2 => EnvFilter::new("site_harvest=trace,debug"),
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

/// Fetches every discovered page and writes the crawl report
async fn handle_crawl(config: &Config, urls: &[String], output: Option<PathBuf>) -> Result<()> {
    let fetcher = HttpPageFetcher::from_config(config).context("Failed to build HTTP client")?;
    let session = CrawlSession::from_config(fetcher, config);

    let report = session.crawl_urls(urls).await;

    let path = output.unwrap_or_else(|| PathBuf::from(&config.output.path));
    report
        .write_report(&path)
        .with_context(|| format!("Failed to write crawl report to {}", path.display()))?;

    print_summary(&report);
    println!("\n✓ Report written to: {}", path.display());

    Ok(())
}
