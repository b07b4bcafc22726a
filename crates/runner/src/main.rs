//! Runs the RemWaste API contract suites against a live backend.
//!
//! Run with: cargo run -p remwaste-runner -- --suite all

mod report;
mod suites;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::bail;
use chrono::Utc;
use clap::Parser;
use remwaste_client::config::{ClientOptions, BASE_URL_ENV};
use remwaste_client::RemWaste;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::report::RunSummary;
use crate::suites::SuiteSelection;

#[derive(Parser, Debug)]
#[command(name = "remwaste-runner", version)]
#[command(about = "Runs the RemWaste API contract suites")]
struct Args {
    /// Backend base URL
    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Suite to run
    #[arg(long, value_enum, default_value = "all")]
    suite: SuiteSelection,

    /// Output directory for the JSON report
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Pause between suites, in milliseconds
    #[arg(long, default_value = "1000")]
    pause_ms: u64,

    /// Probe endpoint accessibility instead of running suites
    #[arg(long)]
    diagnose: bool,

    /// Extra base URLs to probe with --diagnose
    #[arg(long = "candidate")]
    candidates: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok(); // Load .env file if present

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn client_options(base_url: Option<&str>) -> anyhow::Result<ClientOptions> {
    match base_url.map(str::trim) {
        Some("") => bail!("--base-url / {} must not be empty", BASE_URL_ENV),
        Some(url) => Ok(ClientOptions::for_base_url(url)),
        // clap skips an empty variable, so look it up again to reject it
        None => Ok(ClientOptions::from_env()?),
    }
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let options = client_options(args.base_url.as_deref())?;
    let client = RemWaste::new_with_options(options)?;

    if args.diagnose {
        return diagnose(&client, &args.candidates).await;
    }

    let started_at = Utc::now();
    let start = Instant::now();
    let suites = suites::select(args.suite);
    let mut results = Vec::with_capacity(suites.len());

    for (index, suite) in suites.iter().enumerate() {
        if index > 0 && args.pause_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.pause_ms)).await;
        }
        results.push(suite.run(&client).await);
    }

    let summary = RunSummary::new(
        client.http().base_url(),
        started_at,
        results,
        start.elapsed().as_millis() as u64,
    );
    summary.log();
    summary.write_results(&args.output)?;

    Ok(summary.is_success())
}

/// Probe the configured backend and every candidate; succeeds if any is healthy
async fn diagnose(client: &RemWaste, candidates: &[String]) -> anyhow::Result<bool> {
    let mut urls = vec![client.http().base_url().to_string()];
    urls.extend(candidates.iter().cloned());

    let mut healthy = Vec::new();
    for url in &urls {
        let report = client.health().probe(url).await?;
        info!("{}", report.base_url);
        for check in &report.checks {
            info!("  {} {} -> {}", check.method, check.path, check.accessibility);
        }
        if report.is_healthy() {
            healthy.push(url.clone());
        }
    }

    if healthy.is_empty() {
        warn!("No probed backend is healthy");
        return Ok(false);
    }
    info!("Healthy: {}", healthy.join(", "));
    Ok(true)
}
