//! `table_recordlist_date`: Senate CMS listings rendered as a table whose date
//! column carries the `recordListDate` class.

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
    DateFormat::DotShortYear,
    DateFormat::DotFullYear,
    DateFormat::MonthName,
    DateFormat::Iso,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TableRecordlistDate;

impl PatternHandler for TableRecordlistDate {
    fn pattern(&self) -> Pattern {
        Pattern::TableRecordlistDate
    }

    fn pagination(&self) -> PaginationShape {
        PaginationShape::PageQuery
    }

    fn extract(&self, doc: &Html, listing: &Listing) -> Vec<PressRelease> {
        let rows = select_containers(doc, &[selector("table tbody tr"), selector("tr")]);
        let link_sel = [selector("a")];
        let date_sel = [selector("td.recordListDate"), selector(".recordListDate")];

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
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

            let date = first_match(row, &date_sel)
                .and_then(|cell| dates::resolve(&element_text(cell), None, DATE_FORMATS));
            results.push(listing.release(href, title, date));
        }

        debug!(url = %listing.request_url, count = results.len(), "extracted table_recordlist_date rows");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::test_support::{fixture_doc, listing};
    use chrono::NaiveDate;

    const BASE: &str = "https://www.moran.senate.gov/public/index.cfm/news-releases";

    #[test]
    fn three_rows_one_without_date() {
        let doc = fixture_doc("table_recordlist_date.html");
        let listing = listing(BASE, &format!("{BASE}?page=1"));
        let results = TableRecordlistDate.extract(&doc, &listing);

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.date.is_some()).count(), 2);

        assert_eq!(results[0].title, "Moran Secures Funding for Kansas Airports");
        assert_eq!(
            results[0].url,
            "https://www.moran.senate.gov/public/index.cfm/2024/1/moran-secures-funding-for-kansas-airports"
        );
        assert_eq!(results[0].date, NaiveDate::from_ymd_opt(2024, 1, 15));

        assert_eq!(results[1].title, "Moran Statement on Farm Bill Extension");
        assert_eq!(results[1].date, None);

        assert_eq!(
            results[2].url,
            "https://www.moran.senate.gov/public/index.cfm/2023/12/year-in-review"
        );
        assert_eq!(results[2].date, NaiveDate::from_ymd_opt(2023, 12, 29));

        for release in &results {
            assert_eq!(release.source, BASE);
            assert_eq!(release.domain, "www.moran.senate.gov");
        }
    }

    #[test]
    fn unrecognized_date_still_emits_record() {
        let doc = Html::parse_document(
            r#"<table><tr><td class="recordListDate">Sometime in spring</td>
               <td><a href="/release">Spring Update</a></td></tr></table>"#,
        );
        let listing = listing(BASE, BASE);
        let results = TableRecordlistDate.extract(&doc, &listing);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].date, None);
        assert_eq!(results[0].url, "https://www.moran.senate.gov/release");
    }

    #[test]
    fn rows_without_links_are_skipped() {
        let doc = Html::parse_document(
            r#"<table><tr><td class="recordListDate">01/02/24</td><td>No link here</td></tr></table>"#,
        );
        assert!(TableRecordlistDate.extract(&doc, &listing(BASE, BASE)).is_empty());
    }
}
