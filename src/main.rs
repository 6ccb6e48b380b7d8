//! webcp main entry point
//!
//! This is the command-line interface for the webcp site copier.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use webcp::config::{load_session, CrawlSession, SessionArgs};
use webcp::crawler::crawl;
use webcp::output::print_statistics;

/// webcp: smart site crawling
///
/// webcp crawls a site breadth-first from a seed URL, saves every page it
/// fetches under a destination folder, and can resume an interrupted crawl
/// from a log file.
#[derive(Parser, Debug)]
#[command(name = "webcp")]
#[command(version)]
#[command(about = "Smart site crawling", long_about = None)]
struct Cli {
    /// The seed URL from which crawling should begin
    #[arg(value_name = "URL")]
    url: String,

    /// The folder to which the crawl should be saved
    #[arg(value_name = "DEST")]
    dest: PathBuf,

    /// Time to wait between requests to a single host, in seconds [default: 5]
    #[arg(long, value_name = "SECS", allow_negative_numbers = true)]
    delay: Option<f64>,

    /// Stop at this tree depth [default: 5]
    #[arg(long, value_name = "NUM")]
    max_depth: Option<u32>,

    /// Save ongoing status, and resume any previous crawl
    #[arg(long, value_name = "PATH")]
    resume: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Crawl without saving pages
    #[arg(long)]
    no_save: bool,

    /// Validate the session and show it without crawling
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
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let args = SessionArgs {
        seed: cli.url,
        destination: cli.dest,
        delay_secs: cli.delay,
        max_depth: cli.max_depth,
        resume: cli.resume,
        save_pages: cli.no_save.then_some(false),
    };

    let session = match load_session(args, cli.config.as_deref()) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Could not initialize the crawl - {}", e);
            return Err(e).context("invalid crawl settings");
        }
    };

    if cli.dry_run {
        handle_dry_run(&session);
        return Ok(());
    }

    handle_crawl(session, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webcp=info,warn"),
            1 => EnvFilter::new("webcp=debug,info"),
            2 => EnvFilter::new("webcp=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the session that would be crawled
fn handle_dry_run(session: &CrawlSession) {
    println!("=== webcp Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", session.seed);
    println!("  Max depth: {}", session.max_depth);
    println!("  Delay per host: {:?}", session.delay);
    match &session.destination {
        Some(dest) => println!("  Destination: {}", dest.display()),
        None => println!("  Destination: (pages not saved)"),
    }
    match &session.resume {
        Some(path) => println!("  Resume log: {}", path.display()),
        None => println!("  Resume log: (none)"),
    }

    println!("\nHTTP:");
    println!("  User agent: {}", session.http.user_agent);
    match session.http.timeout {
        Some(timeout) => println!("  Timeout: {:?}", timeout),
        None => println!("  Timeout: (transport default)"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(session: CrawlSession, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (max depth {}, delay {:?})",
        session.seed,
        session.max_depth,
        session.delay
    );
    if let Some(path) = &session.resume {
        tracing::info!("Recording progress in {}", path.display());
    }

    let start_time = Instant::now();
    match crawl(session).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            if !quiet {
                print_statistics(&stats, start_time.elapsed());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("crawl failed")
        }
    }
}
