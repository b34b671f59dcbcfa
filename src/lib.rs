//! # statement_scraper
//!
//! Extracts press-release records (title, URL, date, domain) from government
//! press pages and syndication feeds.
//!
//! Most congressional sites fall into one of six listing layouts. A
//! [`registry::Registry`] maps each site to its layout and listing URL; the
//! [`scraper::Scraper`] fetches listings through a [`fetch::Fetch`]
//! implementation and hands each page to the matching
//! [`scrapers::PatternHandler`].
//!
//! ```no_run
//! use statement_scraper::config::FetchConfig;
//! use statement_scraper::fetch::HttpFetcher;
//! use statement_scraper::registry::Registry;
//! use statement_scraper::scraper::Scraper;
//!
//! # async fn run() -> statement_scraper::error::Result<()> {
//! let scraper = Scraper::new(Registry::builtin()?, HttpFetcher::new(&FetchConfig::default())?);
//! for release in scraper.dispatch("moran", 1).await {
//!     println!("{:?} {}", release.date, release.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Fetch failures, missing elements and unrecognized dates never surface as
//! errors on the scraping path; they only reduce the records returned.

pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod pagination;
pub mod registry;
pub mod scraper;
pub mod scrapers;
pub mod urls;
