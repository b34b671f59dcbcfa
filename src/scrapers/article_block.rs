//! `article_block_h2_p_date`: `div.ArticleBlock` entries with an `h2` (or `h3`)
//! headline and a date in the first paragraph or a `time` element.
//!
//! Dates such as `01.15.24` are tried with `.` replaced by `/` first, then as
//! written; the trial is format-major across both renderings.

use scraper::Html;
use tracing::debug;

use super::{Listing, PatternHandler, element_text, first_match, href_of, select_containers, selector};
use crate::dates::{self, DateFormat};
use crate::models::PressRelease;
use crate::pagination::PaginationShape;
use crate::registry::Pattern;

pub const DATE_FORMATS: &[DateFormat] = &[
    DateFormat::SlashShortYear,
    DateFormat::SlashFullYear,
    DateFormat::MonthName,
    DateFormat::MonthAbbrev,
    DateFormat::Iso,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleBlockH2PDate;

impl PatternHandler for ArticleBlockH2PDate {
    fn pattern(&self) -> Pattern {
        Pattern::ArticleBlockH2PDate
    }

    fn pagination(&self) -> PaginationShape {
        PaginationShape::PageNumRs
    }

    fn extract(&self, doc: &Html, listing: &Listing) -> Vec<PressRelease> {
        let blocks = select_containers(doc, &[selector("div.ArticleBlock"), selector(".ArticleBlock")]);
        let link_sel = [selector("h2 a"), selector("h3 a")];
        let date_sel = [selector("p"), selector("time")];

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

            let date = first_match(block, &date_sel).and_then(|elem| {
                let attribute = (elem.value().name() == "time")
                    .then(|| elem.value().attr("datetime"))
                    .flatten();
                let text = element_text(elem);
                let normalized = text.replace('.', "/");
                dates::resolve_variants(&[normalized.as_str(), text.as_str()], attribute, DATE_FORMATS)
            });
            results.push(listing.release(href, title, date));
        }

        debug!(url = %listing.request_url, count = results.len(), "extracted article blocks");
        results
    }
}
