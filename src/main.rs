//! Depthcrawl main entry point
//!
//! This is the command-line interface for the depthcrawl crawler.

use anyhow::{bail, Context};
use clap::Parser;
use depthcrawl::config::{load_config_with_hash, CrawlConfig, CrawlSettings};
use depthcrawl::crawler::{Coordinator, CrawlFlavor, CrawlReport, ExecutionMode, HttpFetcher};
use depthcrawl::output::{render_report, write_report, OutputFormat};
use depthcrawl::storage::{
    open_batch_store, BatchBackend, BatchContextStore, MemoryBatchStore, SqliteBatchStore,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Depthcrawl: a depth-limited recursive web crawler
///
/// Walks a site depth-first from a seed URL and prints either the extracted
/// content of every page or the list of links found. Large crawls can be
/// split into batch steps persisted in a SQLite file.
#[derive(Parser, Debug)]
#[command(name = "depthcrawl")]
#[command(version)]
#[command(about = "A depth-limited recursive web crawler", long_about = None)]
struct Cli {
    /// Path to TOML crawl profile
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL to start crawling from
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Collect links instead of page content
    #[arg(long)]
    links: bool,

    /// Output format: text, json or markdown
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the profile and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["enqueue", "step", "collect", "cancel"])]
    dry_run: bool,

    /// Start a batched crawl and print its run id
    #[arg(long, conflicts_with_all = ["step", "collect", "cancel"])]
    enqueue: bool,

    /// Process queued batch steps (all of them, or at most N)
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "0", conflicts_with_all = ["collect", "cancel"])]
    step: Option<usize>,

    /// Print the report of a drained batch run and forget the run
    #[arg(long, value_name = "RUN_ID", conflicts_with = "cancel")]
    collect: Option<i64>,

    /// Cancel a batch run, keeping its partial report collectable
    #[arg(long, value_name = "RUN_ID")]
    cancel: Option<i64>,

    /// SQLite file holding batch runs
    #[arg(long, value_name = "PATH", default_value = "depthcrawl-batch.db")]
    state_db: PathBuf,
}

impl Cli {
    fn flavor(&self) -> CrawlFlavor {
        if self.links {
            CrawlFlavor::Links
        } else {
            CrawlFlavor::Content
        }
    }

    fn is_batch_command(&self) -> bool {
        self.enqueue || self.step.is_some() || self.collect.is_some() || self.cancel.is_some()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_profile(&cli)?;

    if cli.dry_run {
        return handle_dry_run(&cli, &config);
    }

    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;

    if cli.is_batch_command() {
        let store = open_batch_store(&cli.state_db)
            .with_context(|| format!("Failed to open {}", cli.state_db.display()))?;
        let coordinator = Coordinator::new(config, fetcher, store);
        return handle_batch(&cli, coordinator).await;
    }

    handle_crawl(&cli, config, fetcher).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depthcrawl=info,warn"),
            1 => EnvFilter::new("depthcrawl=debug,info"),
            2 => EnvFilter::new("depthcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the crawl profile, falling back to defaults when none is given
fn load_profile(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            let needs_profile = cli.enqueue || cli.dry_run;
            if needs_profile {
                bail!("a CONFIG file is required for --enqueue and --dry-run");
            }
            Ok(CrawlConfig::from_settings(&CrawlSettings::default())?)
        }
    }
}

fn require_seed(cli: &Cli) -> anyhow::Result<String> {
    match &cli.seed {
        Some(seed) => Ok(seed.clone()),
        None => bail!("--seed is required"),
    }
}

/// Cancels the crawl on Ctrl-C; the partial report is still printed
fn spawn_interrupt_handler<B>(coordinator: &Coordinator<HttpFetcher, B>)
where
    B: BatchBackend,
{
    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; stopping before the next fetch");
            token.cancel();
        }
    });
}

/// Handles the --dry-run mode: validates the profile and shows the plan
fn handle_dry_run(cli: &Cli, config: &CrawlConfig) -> anyhow::Result<()> {
    println!("=== Depthcrawl Dry Run ===\n");

    println!("Traversal:");
    println!("  Depth: {}", config.depth);
    println!("  Host only: {}", config.host_only);
    println!("  Body only: {}", config.body_only);
    println!("  Include source URL: {}", config.include_source_url);
    println!("  Cool down: {:?}", config.cool_down);
    let mut types: Vec<_> = config.types_to_scrape.iter().map(|t| t.as_str()).collect();
    types.sort_unstable();
    println!("  Types to scrape: {}", types.join(", "));
    if let Some(pattern) = &config.include_pattern {
        println!("  Include pattern: {}", pattern);
    }
    if let Some(pattern) = &config.exclude_pattern {
        println!("  Exclude pattern: {}", pattern);
    }
    println!("  Excluded pages: {}", config.exclude_pages.len());

    println!("\nContent:");
    println!("  Mode: {}", config.content_mode);
    println!("  Selector: {}", config.selector.to_css());
    println!("  Remove tags: {}", config.selector_remove_tags.join(", "));
    println!("  URL on top: {}", config.url_on_top);

    println!("\nRequests:");
    println!("  User agent: {}", config.fetch_options.user_agent);
    println!("  Timeout: {:?}", config.fetch_options.timeout);
    println!("  Basic auth: {}", config.fetch_options.basic_auth.is_some());
    println!("  Custom headers: {}", config.fetch_options.headers.len());
    println!("  Cookies: {}", config.fetch_options.cookies.len());

    println!("\n✓ Configuration is valid");
    if let Some(seed) = &cli.seed {
        depthcrawl::url::parse_seed(seed)?;
        println!("✓ Would crawl {} ({:?})", seed, cli.flavor());
    }

    Ok(())
}

/// Handles the main synchronous crawl
async fn handle_crawl(
    cli: &Cli,
    config: CrawlConfig,
    fetcher: HttpFetcher,
) -> anyhow::Result<()> {
    let seed = require_seed(cli)?;
    let mut coordinator = Coordinator::new(config, fetcher, MemoryBatchStore::new());
    spawn_interrupt_handler(&coordinator);

    let outcome = coordinator
        .run(&seed, cli.flavor(), ExecutionMode::Synchronous)
        .await
        .context("Crawl failed")?;

    if outcome.report.cancelled {
        tracing::warn!("Crawl was interrupted; the report is partial");
    }
    emit_report(cli, &outcome.report, cli.flavor())
}

/// Handles --enqueue, --step, --collect and --cancel
async fn handle_batch(
    cli: &Cli,
    mut coordinator: Coordinator<HttpFetcher, SqliteBatchStore>,
) -> anyhow::Result<()> {
    if cli.enqueue {
        let seed = require_seed(cli)?;
        let outcome = coordinator
            .run(&seed, cli.flavor(), ExecutionMode::Batched)
            .await?;
        if let Some(run_id) = outcome.run_id {
            println!("{}", run_id);
        }
        return Ok(());
    }

    if let Some(limit) = cli.step {
        spawn_interrupt_handler(&coordinator);
        let limit = (limit > 0).then_some(limit);
        let processed = coordinator.run_pending(limit).await?;
        tracing::info!("Processed {} batch steps", processed);
        return Ok(());
    }

    if let Some(run_id) = cli.cancel {
        let dropped = coordinator.cancel_run(run_id)?;
        println!("Cancelled run {} ({} queued steps discarded)", run_id, dropped);
        return Ok(());
    }

    if let Some(run_id) = cli.collect {
        let flavor = coordinator.backend().load(run_id)?.flavor;
        return match coordinator.collect(run_id)? {
            Some(report) => {
                if report.incomplete {
                    tracing::warn!("Run {} abandoned at least one step; the report is partial", run_id);
                }
                emit_report(cli, &report, flavor)
            }
            None => bail!("run {} still has queued steps; run --step first", run_id),
        };
    }

    Ok(())
}

fn emit_report(cli: &Cli, report: &CrawlReport, flavor: CrawlFlavor) -> anyhow::Result<()> {
    match &cli.output {
        Some(path) => {
            write_report(report, flavor, cli.format, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => print!("{}", render_report(report, flavor, cli.format)?),
    }
    Ok(())
}
