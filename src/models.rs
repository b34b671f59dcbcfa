//! Data models for extracted press releases.
//!
//! This module defines the output contract shared by every pattern handler
//! and the feed parser:
//! - [`PressRelease`]: one listing item, emitted once and never mutated
//! - [`Batch`]: aggregated results of a bulk run plus the inputs that failed

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single press release extracted from a listing page or feed.
///
/// `source`, `url`, `title` and `domain` are always non-empty when a record is
/// emitted. A missing `date` is an expected outcome: some sites omit it and some
/// render it in a format no handler recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressRelease {
    /// The listing page (or feed) URL that was queried.
    pub source: String,
    /// Absolute URL of the individual release.
    pub url: String,
    /// Trimmed headline text.
    pub title: String,
    /// Publication date, if one could be resolved.
    pub date: Option<NaiveDate>,
    /// Hostname of the listing page.
    pub domain: String,
    /// Party affiliation for committee listings (`"majority"`, `"minority"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
}

impl PressRelease {
    pub fn new(
        source: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        date: Option<NaiveDate>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            url: url.into(),
            title: title.into(),
            date,
            domain: domain.into(),
            party: None,
        }
    }

    /// Tag the record with a committee party.
    pub fn with_party(mut self, party: Option<&str>) -> Self {
        self.party = party.map(str::to_string);
        self
    }
}

/// Results of a bulk run.
///
/// `failures` lists every input (listing URL or feed URL) that could not be
/// fetched or parsed. One failing input never discards the others' results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Batch {
    pub results: Vec<PressRelease>,
    pub failures: Vec<String>,
}

impl Batch {
    /// Fold another batch into this one, keeping input order.
    pub fn extend(&mut self, other: Batch) {
        self.results.extend(other.results);
        self.failures.extend(other.failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_serialization_omits_missing_party() {
        let release = PressRelease::new(
            "https://www.moran.senate.gov/public/index.cfm/news-releases",
            "https://www.moran.senate.gov/public/index.cfm/2024/1/release",
            "Moran Statement",
            NaiveDate::from_ymd_opt(2024, 1, 15),
            "www.moran.senate.gov",
        );

        let json = serde_json::to_string(&release).unwrap();
        assert!(json.contains("\"date\":\"2024-01-15\""));
        assert!(!json.contains("party"));
    }

    #[test]
    fn test_press_release_with_party() {
        let release = PressRelease::new("s", "u", "t", None, "d").with_party(Some("majority"));
        let json = serde_json::to_string(&release).unwrap();
        assert!(json.contains("\"party\":\"majority\""));
        assert!(json.contains("\"date\":null"));
    }

    #[test]
    fn test_press_release_deserialization_without_party() {
        let json = r#"{
            "source": "https://x.senate.gov/press",
            "url": "https://x.senate.gov/press/1",
            "title": "Title",
            "date": null,
            "domain": "x.senate.gov"
        }"#;
        let release: PressRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.party, None);
        assert_eq!(release.date, None);
    }

    #[test]
    fn test_batch_extend_preserves_order() {
        let mut batch = Batch {
            results: vec![PressRelease::new("a", "a/1", "A", None, "a")],
            failures: vec!["https://broken.example/one".into()],
        };
        batch.extend(Batch {
            results: vec![PressRelease::new("b", "b/1", "B", None, "b")],
            failures: vec!["https://broken.example/two".into()],
        });

        assert_eq!(batch.results[0].title, "A");
        assert_eq!(batch.results[1].title, "B");
        assert_eq!(batch.failures.len(), 2);
    }
}
