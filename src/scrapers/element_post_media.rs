//! `element_post_media`: custom `.element` blocks whose title and date live in
//! `post-media-list-*` (newer) or `element-*` (older) sub-elements.

use scraper::Html;
use tracing::debug;

use super::{Listing, PatternHandler, element_text, first_match, href_of, select_containers, selector};
use crate::dates::{self, DateFormat};
use crate::models::PressRelease;
use crate::pagination::PaginationShape;
use crate::registry::Pattern;

pub const DATE_FORMATS: &[DateFormat] = &[
    DateFormat::MonthName,
    DateFormat::SlashFullYear,
    DateFormat::SlashShortYear,
    DateFormat::DotFullYear,
    DateFormat::Iso,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ElementPostMedia;

impl PatternHandler for ElementPostMedia {
    fn pattern(&self) -> Pattern {
        Pattern::ElementPostMedia
    }

    fn pagination(&self) -> PaginationShape {
        PaginationShape::PageQuery
    }

    fn extract(&self, doc: &Html, listing: &Listing) -> Vec<PressRelease> {
        let elements = select_containers(doc, &[selector(".element")]);
        let link_sel = [selector("a")];
        let title_sel = [selector(".post-media-list-title"), selector(".element-title")];
        let date_sel = [selector(".post-media-list-date"), selector(".element-datetime")];

        let mut results = Vec::with_capacity(elements.len());
        for element in elements {
            let Some(link) = first_match(element, &link_sel) else {
                continue;
            };
            let Some(href) = href_of(link) else {
                continue;
            };
            let title = first_match(element, &title_sel)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| element_text(link));
            if title.is_empty() {
                continue;
            }

            let date = first_match(element, &date_sel)
                .and_then(|d| dates::resolve(&element_text(d), None, DATE_FORMATS));
            results.push(listing.release(href, title, date));
        }

        debug!(url = %listing.request_url, count = results.len(), "extracted post-media elements");
        results
    }
}
