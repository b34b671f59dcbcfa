//! `jet_listing_elementor`: WordPress sites built with Elementor and the Jet
//! Engine listing grid.

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
    DateFormat::Iso,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct JetListingElementor;

impl PatternHandler for JetListingElementor {
    fn pattern(&self) -> Pattern {
        Pattern::JetListingElementor
    }

    fn pagination(&self) -> PaginationShape {
        PaginationShape::JetEngine
    }

    fn extract(&self, doc: &Html, listing: &Listing) -> Vec<PressRelease> {
        let items = select_containers(
            doc,
            &[selector(".jet-listing-grid__item"), selector(".elementor-widget-wrap")],
        );
        let link_sel = [selector("h3 a")];
        let date_sel = [
            selector("span.elementor-icon-list-text"),
            selector("li span.elementor-icon-list-text"),
            selector(".elementor-post-date"),
        ];

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let Some(link) = first_match(item, &link_sel) else {
                continue;
            };
            let Some(href) = href_of(link) else {
                continue;
            };
            let title = element_text(link);
            if title.is_empty() {
                continue;
            }

            let date = first_match(item, &date_sel)
                .and_then(|span| dates::resolve(&element_text(span), None, DATE_FORMATS));
            results.push(listing.release(href, title, date));
        }

        debug!(url = %listing.request_url, count = results.len(), "extracted jet listing items");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::test_support::{fixture_doc, listing};
    use chrono::NaiveDate;

    #[test]
    fn grid_items_in_document_order() {
        let base = "https://www.scott.senate.gov/media-center/press-releases";
        let request = PaginationShape::JetEngine.request_url(base, 1);
        let results = JetListingElementor.extract(
            &fixture_doc("jet_listing_elementor.html"),
            &listing(base, &request),
        );

        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Scott Introduces Housing Bill",
                "Scott Statement on Jobs Report",
                "Scott Hosts Town Hall",
            ]
        );
        assert_eq!(results[0].date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(results[1].date, NaiveDate::from_ymd_opt(2024, 1, 12));
        assert_eq!(results[2].date, None);
        assert_eq!(
            results[1].url,
            "https://www.scott.senate.gov/media-center/press-releases/scott-statement-on-jobs-report/"
        );
        assert!(results.iter().all(|r| r.domain == "www.scott.senate.gov"));
    }

    #[test]
    fn falls_back_to_widget_wraps() {
        let base = "https://www.fetterman.senate.gov/press-releases";
        let results = JetListingElementor.extract(
            &fixture_doc("jet_listing_widget_wrap.html"),
            &listing(base, base),
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Fetterman Votes for Rail Safety");
        assert_eq!(results[0].date, NaiveDate::from_ymd_opt(2024, 2, 5));
        assert_eq!(
            results[0].url,
            "https://www.fetterman.senate.gov/press-releases/fetterman-votes-for-rail-safety/"
        );
    }
}
