//! Market Pulse ingestion CLI.
//!
//! Usage:
//!     collect muse --batch tech-all [--max-pages 2] [--dry-run]
//!     collect muse --category "Software Engineering" --level "Mid Level"
//!     collect arbeitnow [--page 1] [--max-pages 3] [--dry-run]
//!     collect salaries --batch locations [--dry-run]
//!     collect ensure-db
//!     collect ensure-roles
//!
//! Requires CLOUDANT_URL and CLOUDANT_APIKEY in .env for anything that
//! writes, and RAPIDAPI_KEY for live salary batches. Dry runs need nothing.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::info;

use market_pulse::config::Config;
use market_pulse::ingest::planner::{self, Preset, RequestDescriptor};
use market_pulse::ingest::{ensure_roles, BatchRunner, Feeds, RunStats};
use market_pulse::sources::{ArbeitnowClient, MuseClient, SalaryClient};
use market_pulse::store::{CloudantStore, DocumentStore};

#[derive(Parser)]
#[command(name = "collect", about = "Market Pulse: job market collection and tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch jobs from The Muse and store them as canonical job_post docs
    Muse {
        /// Preset: tech-all or tech-us
        #[arg(long)]
        batch: Option<String>,
        /// Filter by category (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Filter by level (repeatable)
        #[arg(long = "level")]
        levels: Vec<String>,
        /// Filter by location (repeatable)
        #[arg(long = "location")]
        locations: Vec<String>,
        /// Cap pages fetched per query combo
        #[arg(long)]
        max_pages: Option<u32>,
        /// Preview the planned requests without fetching or storing
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch jobs from the Arbeitnow job board
    Arbeitnow {
        /// Starting page
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Cap number of pages to fetch
        #[arg(long)]
        max_pages: Option<u32>,
        /// Preview the planned request without fetching or storing
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch salary benchmarks for a batch preset
    Salaries {
        /// Preset: locations, experience, or companies
        #[arg(long)]
        batch: String,
        /// Preview the planned queries without fetching or storing
        #[arg(long)]
        dry_run: bool,
    },
    /// Create the Cloudant database if missing
    EnsureDb,
    /// Write any missing canonical role documents
    EnsureRoles,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("market_pulse=info,collect=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let http = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    match cli.command {
        Command::Muse {
            batch,
            categories,
            levels,
            locations,
            max_pages,
            dry_run,
        } => {
            let plan = match batch {
                Some(name) => planner::plan(name.parse::<Preset>()?),
                None => planner::plan_filters(&categories, &levels, &locations)?,
            };
            let muse = MuseClient::new(http);
            let feeds = Feeds {
                jobs: Some(&muse),
                salaries: None,
            };
            run_jobs(&config, &plan, &feeds, BatchRunner::new(dry_run, max_pages), dry_run).await?;
        }
        Command::Arbeitnow {
            page,
            max_pages,
            dry_run,
        } => {
            // One descriptor: Arbeitnow is a single undimensioned stream.
            let plan = vec![RequestDescriptor::JobSearch(planner::JobQuery {
                categories: vec![],
                levels: vec![],
                locations: vec![],
            })];
            let arbeitnow = ArbeitnowClient::new(http);
            let feeds = Feeds {
                jobs: Some(&arbeitnow),
                salaries: None,
            };
            let runner = BatchRunner::new(dry_run, max_pages).start_page(page);
            run_jobs(&config, &plan, &feeds, runner, dry_run).await?;
        }
        Command::Salaries { batch, dry_run } => {
            let plan = planner::plan(batch.parse::<Preset>()?);
            let runner = BatchRunner::new(dry_run, None);
            if dry_run {
                report(runner.run(&plan, &Feeds::default(), None).await?);
            } else {
                let salary = SalaryClient::new(http, config.rapidapi_key()?);
                let feeds = Feeds {
                    jobs: None,
                    salaries: Some(&salary),
                };
                let store = open_store(&config).await?;
                report(runner.run(&plan, &feeds, Some(&store)).await?);
            }
        }
        Command::EnsureDb => {
            open_store(&config).await?;
        }
        Command::EnsureRoles => {
            let store = open_store(&config).await?;
            let created = ensure_roles(&store).await?;
            info!(
                "Done. {created} role document(s) created, {} ensured total",
                market_pulse::ingest::roles::DEFAULT_ROLES.len()
            );
        }
    }

    Ok(())
}

/// Connects to Cloudant and creates the database if missing. Missing
/// credentials surface here as a fatal configuration error.
async fn open_store(config: &Config) -> Result<CloudantStore> {
    let store = CloudantStore::new(&config.cloudant()?)?;
    store.ensure_database().await?;
    Ok(store)
}

async fn run_jobs(
    config: &Config,
    plan: &[RequestDescriptor],
    feeds: &Feeds<'_>,
    runner: BatchRunner,
    dry_run: bool,
) -> Result<(), anyhow::Error> {
    if dry_run {
        report(runner.run(plan, feeds, None).await?);
        return Ok(());
    }
    let store = open_store(config).await?;
    ensure_roles(&store).await?;
    report(runner.run(plan, feeds, Some(&store)).await?);
    Ok(())
}

fn report(stats: RunStats) {
    info!(
        "Run complete: fetched={} inserted={} skipped={} failed={}",
        stats.fetched, stats.inserted, stats.skipped, stats.failed
    );
}
