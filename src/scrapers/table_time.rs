//! `table_time`: House listings in a plain table, header in the first row and
//! a `time` element per item.

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
    DateFormat::Iso,
    DateFormat::MonthName,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TableTime;

impl PatternHandler for TableTime {
    fn pattern(&self) -> Pattern {
        Pattern::TableTime
    }

    fn pagination(&self) -> PaginationShape {
        PaginationShape::PageQuery
    }

    fn extract(&self, doc: &Html, listing: &Listing) -> Vec<PressRelease> {
        let rows = select_containers(doc, &[selector("table tr"), selector("tr")]);
        let link_sel = [selector("td a"), selector("a")];
        let time_sel = [selector("time")];

        let mut results = Vec::with_capacity(rows.len());
        // The first row is the header.
        for row in rows.into_iter().skip(1) {
            let Some(link) = first_match(row, &link_sel) else {
                continue;
            };
            let Some(href) = href_of(link) else {
                continue;
            };
            let title = element_text(link);
            if title.is_empty() {
                continue;
            }

            let date = first_match(row, &time_sel).and_then(|time| {
                let attribute = time.value().attr("datetime");
                let text = element_text(time);
                let variants: Vec<&str> = attribute.into_iter().chain([text.as_str()]).collect();
                dates::resolve_variants(&variants, attribute, DATE_FORMATS)
            });
            results.push(listing.release(href, title, date));
        }

        debug!(url = %listing.request_url, count = results.len(), "extracted table_time rows");
        results
    }
}
