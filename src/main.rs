//! # statement
//!
//! Command-line front end: scrape one site, one layout pattern, the whole
//! registry, or a set of feeds, and print the records as JSON.
//!
//! ```sh
//! RUST_LOG=debug statement site moran
//! ```
//!
//! Logs go to stderr so stdout stays valid JSON.

use std::error::Error;

use clap::Parser;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use statement_scraper::cli::{Cli, Command};
use statement_scraper::config::Settings;
use statement_scraper::feed;
use statement_scraper::fetch::HttpFetcher;
use statement_scraper::outputs::json;
use statement_scraper::registry::{Registry, SiteConfig};
use statement_scraper::scraper::Scraper;

#[derive(Serialize)]
struct SiteRow<'a> {
    id: &'a str,
    #[serde(flatten)]
    site: &'a SiteConfig,
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref())?;
    let registry = match &settings.registry {
        Some(path) => Registry::load_from(path)?,
        None => Registry::builtin()?,
    };
    info!(sites = registry.len(), "registry ready");

    let fetcher = HttpFetcher::new(&settings.fetch)?;
    let scraper = Scraper::new(registry, fetcher);
    let output = args.output.as_deref();

    match args.command {
        Command::Site { id, page } => {
            if !scraper.registry().contains(&id) {
                warn!(site_id = %id, "site is not in the registry");
            }
            let results = scraper.dispatch(&id, page).await;
            info!(site_id = %id, page, count = results.len(), "site scraped");
            json::write_records(&results, output).await?;
        }
        Command::Pattern { name, urls, page } => {
            let urls = (!urls.is_empty()).then_some(urls.as_slice());
            let batch = scraper.run_pattern_batch(name, urls, page).await;
            if !batch.failures.is_empty() {
                warn!(failures = ?batch.failures, "some listings could not be fetched");
            }
            json::write_records(&batch.results, output).await?;
        }
        Command::All { page } => {
            let batch = scraper.run_all(page).await;
            json::write_records(&batch, output).await?;
        }
        Command::Feeds { urls } => {
            let batch = feed::batch(scraper.fetcher(), &urls).await;
            json::write_records(&batch, output).await?;
        }
        Command::Sites { pattern } => {
            let rows: Vec<SiteRow> = scraper
                .registry()
                .iter()
                .filter(|(_, site)| pattern.is_none_or(|p| site.pattern == p))
                .map(|(id, site)| SiteRow { id, site })
                .collect();
            let per_pattern = rows.iter().map(|row| row.site.pattern.as_str()).counts();
            info!(sites = rows.len(), ?per_pattern, "listing registry");
            json::write_records(&rows, output).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "execution complete");
    Ok(())
}
