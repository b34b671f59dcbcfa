//! Dispatcher and bulk runner.
//!
//! [`Scraper`] composes a [`Registry`] with a [`Fetch`] implementation. Every
//! listing URL is fetched and extracted to completion before the next one
//! starts, so output order follows input order and, within a page, document
//! order.

use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{info, instrument, warn};
use url::Url;

use crate::fetch::Fetch;
use crate::models::{Batch, PressRelease};
use crate::registry::{Pattern, Registry};
use crate::scrapers::{Listing, PatternHandler, handler_for};

/// Runs pattern handlers against registered sites.
#[derive(Debug)]
pub struct Scraper<F> {
    registry: Registry,
    fetcher: F,
}

impl<F: Fetch> Scraper<F> {
    pub fn new(registry: Registry, fetcher: F) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Scrape one registered site.
    ///
    /// An unknown `site_id` yields an empty vector, exactly like a known site
    /// whose page had no releases. Use [`Registry::contains`] to tell them apart.
    #[instrument(level = "info", skip(self))]
    pub async fn dispatch(&self, site_id: &str, page: u32) -> Vec<PressRelease> {
        let Some(site) = self.registry.get(site_id) else {
            warn!(site_id, "unknown site id; returning no results");
            return Vec::new();
        };
        let urls = [site.url_base.clone()];
        self.run_pattern(site.pattern, Some(urls.as_slice()), page).await
    }

    /// Run `pattern` over `urls`, or over every registered site using it.
    ///
    /// Listings that fail to fetch contribute nothing; the rest are kept.
    pub async fn run_pattern(
        &self,
        pattern: Pattern,
        urls: Option<&[String]>,
        page: u32,
    ) -> Vec<PressRelease> {
        self.run_pattern_batch(pattern, urls, page).await.results
    }

    /// Like [`run_pattern`](Self::run_pattern), also reporting which
    /// `url_base` values could not be fetched.
    #[instrument(level = "info", skip(self, urls))]
    pub async fn run_pattern_batch(
        &self,
        pattern: Pattern,
        urls: Option<&[String]>,
        page: u32,
    ) -> Batch {
        let urls = match urls {
            Some(urls) => urls.to_vec(),
            None => self.registry.urls_for(pattern),
        };
        let handler = handler_for(pattern);

        let outcomes: Vec<(String, Option<Vec<PressRelease>>)> = stream::iter(urls)
            .then(|url_base| async move {
                let outcome = self.scrape_listing(handler, &url_base, page).await;
                (url_base, outcome)
            })
            .collect()
            .await;

        let mut batch = Batch::default();
        for (url_base, outcome) in outcomes {
            match outcome {
                Some(results) => batch.results.extend(results),
                None => batch.failures.push(url_base),
            }
        }
        batch
    }

    /// Every pattern over every registered site.
    #[instrument(level = "info", skip(self))]
    pub async fn run_all(&self, page: u32) -> Batch {
        let mut batch = Batch::default();
        for pattern in Pattern::ALL {
            batch.extend(self.run_pattern_batch(pattern, None, page).await);
        }

        let domains = batch.results.iter().map(|r| r.domain.as_str()).unique().count();
        info!(
            records = batch.results.len(),
            failures = batch.failures.len(),
            domains,
            "bulk run complete"
        );
        batch
    }

    /// `None` when the listing could not be fetched.
    async fn scrape_listing(
        &self,
        handler: &dyn PatternHandler,
        url_base: &str,
        page: u32,
    ) -> Option<Vec<PressRelease>> {
        let request = handler.request_url(url_base, page);
        let request_url = match Url::parse(&request) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %request, error = %e, "unparseable listing URL; skipping");
                return None;
            }
        };

        let Some(doc) = self.fetcher.open_html(&request).await else {
            warn!(url = %request, pattern = %handler.pattern(), "listing fetch failed; skipping");
            return None;
        };

        let listing = Listing::new(url_base, request_url);
        let party = self.registry.party_for(url_base);
        let results: Vec<PressRelease> = handler
            .extract(&doc, &listing)
            .into_iter()
            .map(|release| release.with_party(party))
            .collect();

        info!(
            pattern = %handler.pattern(),
            url = %request,
            count = results.len(),
            "scraped listing"
        );
        Some(results)
    }
}
