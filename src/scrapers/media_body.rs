//! `media_body`: House Drupal listings built from Bootstrap `media-body` blocks.

use scraper::{ElementRef, Html};
use tracing::debug;

use super::{Listing, PatternHandler, element_text, first_match, href_of, select_containers, selector};
use crate::dates::{self, DateFormat};
use crate::models::PressRelease;
use crate::pagination::PaginationShape;
use crate::registry::Pattern;

pub const DATE_FORMATS: &[DateFormat] = &[
    DateFormat::SlashShortYear,
    DateFormat::MonthName,
    DateFormat::Iso,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MediaBody;

/// First non-blank text node directly inside `block`.
fn loose_text(block: ElementRef<'_>) -> Option<String> {
    block
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

impl PatternHandler for MediaBody {
    fn pattern(&self) -> Pattern {
        Pattern::MediaBody
    }

    fn pagination(&self) -> PaginationShape {
        PaginationShape::ZeroBasedPageQuery
    }

    fn extract(&self, doc: &Html, listing: &Listing) -> Vec<PressRelease> {
        let blocks = select_containers(doc, &[selector("div.media-body"), selector(".media-body")]);
        let link_sel = [selector("a")];
        let date_sel = [selector(".row .col-auto")];

        let mut results = Vec::with_capacity(blocks.len());
        for block in blocks {
            let Some(link) = first_match(block, &link_sel) else {
                continue;
            };
            let Some(href) = href_of(link) else {
                continue;
            };
            let title = element_text(link);
            if title.is_empty() {
                continue;
            }

            let date_text = first_match(block, &date_sel)
                .map(element_text)
                .or_else(|| loose_text(block));
            let date = date_text.and_then(|text| dates::resolve(&text, None, DATE_FORMATS));
            results.push(listing.release(href, title, date));
        }

        debug!(url = %listing.request_url, count = results.len(), "extracted media-body blocks");
        results
    }
}
