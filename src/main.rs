//! # The Watchman
//!
//! A batch job that turns RSS feeds into a two-column newspaper PDF and mails
//! it, typically to an e-reader inbox.
//!
//! ## Usage
//!
//! ```sh
//! watchman --config config.yml --output-dir pdfs
//! ```
//!
//! ## Architecture
//!
//! One run is a straight line:
//! 1. **Edition**: bump the edition counter, before any network activity
//! 2. **Pipeline**: for each configured feed, in order, extract the latest
//!    article if the feed changed since its cached snapshot
//! 3. **Compose**: flow the articles into columns and write `DD_MM_YYYY.pdf`
//! 4. **Deliver**: mail the PDF as an attachment
//!
//! A failing feed only costs that feed's article. Configuration, counter,
//! rendering and delivery failures end the run.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cache;
mod cli;
mod config;
mod delivery;
mod edition;
mod error;
mod fetch;
mod markup;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cache::FeedCache;
use cli::Cli;
use config::{FeedConfig, MailSettings};
use edition::EditionCounter;
use error::{ConfigError, RunError};
use fetch::{FetchAsync, HttpFetcher};
use models::Edition;
use outputs::pdf;

/// Run one edition end to end with a real HTTP fetcher.
async fn run(args: &Cli) -> Result<(), RunError> {
    let fetcher = HttpFetcher::new().map_err(ConfigError::HttpClient)?;
    run_with(&fetcher, args).await.map(|_| ())
}

/// Run one edition, fetching through `fetcher`.
///
/// # Arguments
///
/// * `fetcher` - Source of feed and article page bodies
/// * `args` - Parsed command line, including the mail settings
///
/// # Returns
///
/// The path of the written PDF. Per-feed failures are logged and never make
/// this fail; counter, config, render and delivery failures do.
#[instrument(level = "info", skip_all)]
async fn run_with<F: FetchAsync>(fetcher: &F, args: &Cli) -> Result<PathBuf, RunError> {
    let number = EditionCounter::new(&args.edition_file).advance().await?;
    let edition = Edition {
        number,
        date: Local::now().date_naive(),
    };
    info!(edition = edition.number, date = %edition.date, "Starting edition");

    // Check mail settings up front so a misconfigured run fails before the
    // cache is touched.
    let mail = if args.skip_delivery {
        None
    } else {
        Some(MailSettings::from_parts(
            args.mail_account.clone(),
            args.mail_password.clone(),
            args.recipient.clone(),
            args.smtp_host.clone(),
            args.smtp_port,
        )?)
    };

    let config = FeedConfig::load(&args.config).await?;

    let cache = FeedCache::new(&args.cache_dir);
    if args.clear_cache {
        if let Err(e) = cache.clear().await {
            error!(dir = %cache.dir().display(), error = %e, "Could not clear cache");
        }
    }

    let report = pipeline::run(fetcher, &cache, &config).await;

    let document = pdf::compose(&report.articles, &edition, &args.output_dir).await?;

    match mail {
        Some(settings) => delivery::send(&settings, &document).await?,
        None => info!(path = %document.display(), "Delivery skipped"),
    }
    Ok(document)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("watchman starting up");

    // .env first so clap's env fallbacks can see it
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }
    let args = Cli::parse();
    debug!(?args.config, ?args.output_dir, ?args.cache_dir, "Parsed CLI arguments");

    if let Err(e) = run(&args).await {
        error!(error = %e, "Run failed");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Success!"
    );
    Ok(())
}
