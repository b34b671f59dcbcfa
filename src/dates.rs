//! Multi-format date resolution.
//!
//! Listing pages render dates however their CMS likes. Resolution is a pure
//! function over an ordered list of [`DateFormat`]s: the first format whose
//! shape matches the *whole* trimmed string wins, so the order a handler passes
//! in is its precedence rule. Nothing is guessed; an unmatched string resolves
//! to `None`.
//!
//! A machine-readable attribute (the `datetime` of a `<time>` element) always
//! takes precedence over display text when it parses.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static SLASH_SHORT: Lazy<Regex> = Lazy::new(|| numeric(r"/", 2));
static SLASH_FULL: Lazy<Regex> = Lazy::new(|| numeric(r"/", 4));
static DOT_SHORT: Lazy<Regex> = Lazy::new(|| numeric(r"\.", 2));
static DOT_FULL: Lazy<Regex> = Lazy::new(|| numeric(r"\.", 4));
static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)\s+(\d{1,2}),\s+(\d{4})$").expect("valid month-name regex")
});
static ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid ISO regex"));

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn numeric(separator: &str, year_digits: usize) -> Regex {
    Regex::new(&format!(
        r"^(\d{{1,2}}){separator}(\d{{1,2}}){separator}(\d{{{year_digits}}})$"
    ))
    .expect("valid numeric date regex")
}

/// One display format observed on listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `MM/DD/YY`
    SlashShortYear,
    /// `MM/DD/YYYY`
    SlashFullYear,
    /// `MM.DD.YY`
    DotShortYear,
    /// `MM.DD.YYYY`
    DotFullYear,
    /// `January 15, 2024`
    MonthName,
    /// `Jan 15, 2024`
    MonthAbbrev,
    /// `2024-01-15`
    Iso,
}

impl DateFormat {
    /// Every supported format in canonical trial order.
    pub const CANONICAL: [DateFormat; 7] = [
        DateFormat::SlashShortYear,
        DateFormat::SlashFullYear,
        DateFormat::DotShortYear,
        DateFormat::DotFullYear,
        DateFormat::MonthName,
        DateFormat::MonthAbbrev,
        DateFormat::Iso,
    ];

    /// `strftime`-style label, for diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            DateFormat::SlashShortYear => "%m/%d/%y",
            DateFormat::SlashFullYear => "%m/%d/%Y",
            DateFormat::DotShortYear => "%m.%d.%y",
            DateFormat::DotFullYear => "%m.%d.%Y",
            DateFormat::MonthName => "%B %d, %Y",
            DateFormat::MonthAbbrev => "%b %d, %Y",
            DateFormat::Iso => "%Y-%m-%d",
        }
    }

    /// Parse `text` with this format alone. The whole string must match.
    pub fn parse(self, text: &str) -> Option<NaiveDate> {
        match self {
            DateFormat::SlashShortYear => month_day_year(&SLASH_SHORT, text, true),
            DateFormat::SlashFullYear => month_day_year(&SLASH_FULL, text, false),
            DateFormat::DotShortYear => month_day_year(&DOT_SHORT, text, true),
            DateFormat::DotFullYear => month_day_year(&DOT_FULL, text, false),
            DateFormat::MonthName => named_month(text, false),
            DateFormat::MonthAbbrev => named_month(text, true),
            DateFormat::Iso => {
                let caps = ISO.captures(text)?;
                NaiveDate::from_ymd_opt(
                    caps[1].parse().ok()?,
                    caps[2].parse().ok()?,
                    caps[3].parse().ok()?,
                )
            }
        }
    }
}

fn month_day_year(shape: &Regex, text: &str, short_year: bool) -> Option<NaiveDate> {
    let caps = shape.captures(text)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if short_year {
        year = expand_short_year(year);
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years pivot the way POSIX `strptime` does: 69-99 are 19xx.
fn expand_short_year(year: i32) -> i32 {
    if year < 69 { 2000 + year } else { 1900 + year }
}

fn named_month(text: &str, abbreviated: bool) -> Option<NaiveDate> {
    let caps = MONTH_DAY_YEAR.captures(text)?;
    let name = caps[1].to_ascii_lowercase();
    let index = MONTHS.iter().position(|full| {
        if abbreviated {
            name.len() == 3 && full.starts_with(name.as_str())
        } else {
            *full == name
        }
    })?;
    NaiveDate::from_ymd_opt(
        caps[3].parse().ok()?,
        index as u32 + 1,
        caps[2].parse().ok()?,
    )
}

/// Parse a machine-readable date attribute: `YYYY-MM-DD`, RFC 3339, or a
/// naive `YYYY-MM-DDTHH:MM[:SS]` timestamp.
pub fn parse_machine_date(attribute: &str) -> Option<NaiveDate> {
    let attribute = attribute.trim();
    if attribute.is_empty() {
        return None;
    }
    DateFormat::Iso
        .parse(attribute)
        .or_else(|| {
            DateTime::parse_from_rfc3339(attribute)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(attribute, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Resolve a date from display text and an optional machine attribute.
///
/// The attribute short-circuits everything when it parses. Otherwise `formats`
/// are tried in order against the trimmed text.
pub fn resolve(raw: &str, attribute: Option<&str>, formats: &[DateFormat]) -> Option<NaiveDate> {
    resolve_variants(&[raw], attribute, formats)
}

/// Like [`resolve`], but with several renderings of the same text.
///
/// Trial is format-major: every variant is tried with the first format before
/// the second format is considered.
pub fn resolve_variants(
    variants: &[&str],
    attribute: Option<&str>,
    formats: &[DateFormat],
) -> Option<NaiveDate> {
    if let Some(date) = attribute.and_then(parse_machine_date) {
        return Some(date);
    }
    formats.iter().find_map(|format| {
        variants
            .iter()
            .find_map(|variant| format.parse(variant.trim()))
    })
}

/// Date resolver used for syndication feeds: RFC 2822 (`pubDate`), RFC 3339
/// (Atom), then the canonical display formats.
pub fn resolve_feed_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|dt| dt.date_naive())
        .or_else(|| parse_machine_date(text))
        .or_else(|| resolve(text, None, &DateFormat::CANONICAL))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_15() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, 15)
    }

    #[test]
    fn test_each_canonical_format() {
        let cases = [
            (DateFormat::SlashShortYear, "01/15/24"),
            (DateFormat::SlashFullYear, "01/15/2024"),
            (DateFormat::DotShortYear, "01.15.24"),
            (DateFormat::DotFullYear, "01.15.2024"),
            (DateFormat::MonthName, "January 15, 2024"),
            (DateFormat::MonthAbbrev, "Jan 15, 2024"),
            (DateFormat::Iso, "2024-01-15"),
        ];
        for (format, text) in cases {
            assert_eq!(format.parse(text), jan_15(), "{} on {text}", format.label());
        }
    }

    #[test]
    fn test_canonical_list_resolves_all_renderings() {
        for text in [
            "01/15/24",
            "1/15/2024",
            "01.15.24",
            "01.15.2024",
            "january 15, 2024",
            "JAN 15, 2024",
            "2024-01-15",
        ] {
            assert_eq!(resolve(text, None, &DateFormat::CANONICAL), jan_15(), "{text}");
        }
    }

    #[test]
    fn test_full_string_must_match() {
        assert_eq!(DateFormat::SlashShortYear.parse("01/15/2024"), None);
        assert_eq!(DateFormat::SlashFullYear.parse("01/15/24"), None);
        assert_eq!(DateFormat::Iso.parse("2024-01-15 extra"), None);
        assert_eq!(DateFormat::MonthName.parse("Posted January 15, 2024"), None);
    }

    #[test]
    fn test_month_name_and_abbreviation_are_distinct() {
        assert_eq!(DateFormat::MonthName.parse("Jan 15, 2024"), None);
        assert_eq!(DateFormat::MonthAbbrev.parse("January 15, 2024"), None);
        assert_eq!(DateFormat::MonthAbbrev.parse("Sep 3, 2023"), NaiveDate::from_ymd_opt(2023, 9, 3));
    }

    #[test]
    fn test_short_year_pivot() {
        assert_eq!(DateFormat::SlashShortYear.parse("03/01/68"), NaiveDate::from_ymd_opt(2068, 3, 1));
        assert_eq!(DateFormat::SlashShortYear.parse("03/01/69"), NaiveDate::from_ymd_opt(1969, 3, 1));
    }

    #[test]
    fn test_invalid_calendar_date_is_unresolved() {
        assert_eq!(resolve("02/30/2024", None, &DateFormat::CANONICAL), None);
        assert_eq!(resolve("13/01/24", None, &DateFormat::CANONICAL), None);
    }

    #[test]
    fn test_format_order_is_precedence() {
        // Only the formats passed in are considered.
        let only_names = [DateFormat::MonthName];
        assert_eq!(resolve("01/15/24", None, &only_names), None);
        assert_eq!(resolve("  January 15, 2024 ", None, &only_names), jan_15());
    }

    #[test]
    fn test_attribute_takes_precedence_over_text() {
        let resolved = resolve("March 3, 2023", Some("2024-01-15"), &DateFormat::CANONICAL);
        assert_eq!(resolved, jan_15());

        let resolved = resolve(
            "03/03/23",
            Some("2024-01-15T09:30:00-05:00"),
            &DateFormat::CANONICAL,
        );
        assert_eq!(resolved, jan_15());
    }

    #[test]
    fn test_unparsable_attribute_falls_back_to_text() {
        let resolved = resolve("01/15/24", Some("yesterday"), &DateFormat::CANONICAL);
        assert_eq!(resolved, jan_15());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let first = resolve("January 15, 2024", None, &DateFormat::CANONICAL);
        for _ in 0..5 {
            assert_eq!(resolve("January 15, 2024", None, &DateFormat::CANONICAL), first);
        }
    }

    #[test]
    fn test_unmatched_text_is_unresolved() {
        assert_eq!(resolve("last Tuesday", None, &DateFormat::CANONICAL), None);
        assert_eq!(resolve("", None, &DateFormat::CANONICAL), None);
    }

    #[test]
    fn test_variants_are_format_major() {
        let raw = "01.15.24";
        let normalized = raw.replace('.', "/");
        let formats = [DateFormat::SlashShortYear, DateFormat::DotShortYear];
        assert_eq!(resolve_variants(&[normalized.as_str(), raw], None, &formats), jan_15());
        assert_eq!(resolve_variants(&[raw], None, &formats), jan_15());
        assert_eq!(resolve_variants(&[raw], None, &formats[..1]), None);
    }

    #[test]
    fn test_machine_date_shapes() {
        assert_eq!(parse_machine_date("2024-01-15"), jan_15());
        assert_eq!(parse_machine_date("2024-01-15T23:10:00Z"), jan_15());
        assert_eq!(parse_machine_date("2024-01-15T08:00"), jan_15());
        assert_eq!(parse_machine_date(""), None);
    }

    #[test]
    fn test_feed_dates() {
        assert_eq!(resolve_feed_date("Mon, 15 Jan 2024 10:00:00 -0500"), jan_15());
        assert_eq!(resolve_feed_date("2024-01-15T10:00:00+00:00"), jan_15());
        assert_eq!(resolve_feed_date("01/15/2024"), jan_15());
        assert_eq!(resolve_feed_date("soon"), None);
    }
}
