//! Layout-pattern extraction handlers.
//!
//! Roughly 290 government press pages share six recurring layouts. Each
//! layout is a [`PatternHandler`]: it owns one [`PaginationShape`] and knows
//! how to turn a parsed listing page into [`PressRelease`] records.
//!
//! # Patterns
//!
//! | Pattern | Module | Container | Date source |
//! |---------|--------|-----------|-------------|
//! | `table_recordlist_date` | [`table_recordlist`] | table row | `td.recordListDate` |
//! | `jet_listing_elementor` | [`jet_listing`] | grid item | icon-list text span |
//! | `article_block_h2_p_date` | [`article_block`] | `div.ArticleBlock` | first `p` or `time` |
//! | `table_time` | [`table_time`] | table row after the header | `time[datetime]` |
//! | `element_post_media` | [`element_post_media`] | `.element` | date sub-element |
//! | `media_body` | [`media_body`] | `div.media-body` | `.col-auto` or loose text |
//!
//! # Common rules
//!
//! - Containers come from a primary selector; when it matches nothing, the
//!   first fallback with matches is used for the whole document.
//! - A container without a link (or with an empty title) is skipped.
//! - A missing or unparseable date leaves `date` as `None`; the record is
//!   still emitted.
//! - `domain` is the host of the request URL, never of the item link.

use chrono::NaiveDate;
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::PressRelease;
use crate::pagination::PaginationShape;
use crate::registry::Pattern;
use crate::urls::{absolute_link, domain_of};

pub mod article_block;
pub mod element_post_media;
pub mod jet_listing;
pub mod media_body;
pub mod table_recordlist;
pub mod table_time;

/// The page being extracted: where it came from and where it was fetched.
#[derive(Debug, Clone)]
pub struct Listing {
    /// `url_base` as supplied by the caller.
    pub source: String,
    /// The paginated URL that was actually requested.
    pub request_url: Url,
    /// Host of `request_url`.
    pub domain: String,
}

impl Listing {
    pub fn new(source: impl Into<String>, request_url: Url) -> Self {
        let domain = domain_of(&request_url);
        Self {
            source: source.into(),
            request_url,
            domain,
        }
    }

    /// Build a record for an item on this listing, resolving `href`.
    pub fn release(&self, href: &str, title: String, date: Option<NaiveDate>) -> PressRelease {
        PressRelease::new(
            self.source.clone(),
            absolute_link(&self.request_url, href),
            title,
            date,
            self.domain.clone(),
        )
    }
}

/// One reusable listing layout.
pub trait PatternHandler: Send + Sync {
    fn pattern(&self) -> Pattern;

    /// The single pagination shape this layout uses.
    fn pagination(&self) -> PaginationShape;

    /// Extract every release on a parsed listing page, in document order.
    fn extract(&self, doc: &Html, listing: &Listing) -> Vec<PressRelease>;

    fn request_url(&self, url_base: &str, page: u32) -> String {
        self.pagination().request_url(url_base, page)
    }
}

/// Handler for `pattern`.
pub fn handler_for(pattern: Pattern) -> &'static dyn PatternHandler {
    match pattern {
        Pattern::TableRecordlistDate => &table_recordlist::TableRecordlistDate,
        Pattern::JetListingElementor => &jet_listing::JetListingElementor,
        Pattern::ArticleBlockH2PDate => &article_block::ArticleBlockH2PDate,
        Pattern::TableTime => &table_time::TableTime,
        Pattern::ElementPostMedia => &element_post_media::ElementPostMedia,
        Pattern::MediaBody => &media_body::MediaBody,
    }
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

/// Containers matched by the first selector that matches anything.
pub(crate) fn select_containers<'a>(doc: &'a Html, selectors: &[Selector]) -> Vec<ElementRef<'a>> {
    selectors
        .iter()
        .map(|s| doc.select(s).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// First descendant of `element` matching any selector, tried in order.
pub(crate) fn first_match<'a>(element: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| element.select(s).next())
}

/// All text under `element`, trimmed, with whitespace runs collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().join(" ")
}

/// Non-empty `href` of a link element.
pub(crate) fn href_of(element: ElementRef<'_>) -> Option<&str> {
    element
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_has_its_own_handler() {
        for pattern in Pattern::ALL {
            assert_eq!(handler_for(pattern).pattern(), pattern);
        }
    }

    #[test]
    fn container_fallback_is_all_or_nothing() {
        let doc = Html::parse_document(
            r#"<div class="secondary">one</div><div class="secondary">two</div>"#,
        );
        let found = select_containers(&doc, &[selector(".primary"), selector(".secondary")]);
        assert_eq!(found.len(), 2);

        let mixed = Html::parse_document(
            r#"<div class="primary">a</div><div class="secondary">b</div>"#,
        );
        let found = select_containers(&mixed, &[selector(".primary"), selector(".secondary")]);
        assert_eq!(found.len(), 1);
        assert_eq!(element_text(found[0]), "a");
    }

    #[test]
    fn element_text_collapses_whitespace() {
        let doc = Html::parse_fragment("<a href=\"/x\">\n  Senator   <b>Announces</b>\n Funding </a>");
        let link = doc.select(&selector("a")).next().unwrap();
        assert_eq!(element_text(link), "Senator Announces Funding");
        assert_eq!(href_of(link), Some("/x"));
    }

    #[test]
    fn empty_href_is_absent() {
        let doc = Html::parse_fragment(r#"<a href="  ">Title</a><a>None</a>"#);
        let links: Vec<_> = doc.select(&selector("a")).collect();
        assert_eq!(href_of(links[0]), None);
        assert_eq!(href_of(links[1]), None);
    }

    #[test]
    fn listing_domain_comes_from_request_url() {
        let listing = test_support::listing(
            "https://www.moran.senate.gov/public/index.cfm/news-releases",
            "https://www.moran.senate.gov/public/index.cfm/news-releases?page=2",
        );
        let release = listing.release("https://elsewhere.gov/item", "Title".into(), None);
        assert_eq!(release.domain, "www.moran.senate.gov");
        assert_eq!(release.url, "https://elsewhere.gov/item");
        assert_eq!(
            release.source,
            "https://www.moran.senate.gov/public/index.cfm/news-releases"
        );
    }
}
