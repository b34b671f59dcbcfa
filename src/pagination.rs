//! Pagination shapes: how `(url_base, page)` becomes a request URL.
//!
//! Every handler owns exactly one shape and never tries another one
//! speculatively. The jet-engine shape inspects markers already present in
//! `url_base` to decide between its path and query renderings.

use once_cell::sync::Lazy;
use regex::Regex;

static PAGENUM_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/pagenum/\d+/").expect("valid pagenum regex"));
static PAGENUM_RS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"PageNum_rs=\d*").expect("valid PageNum_rs regex"));

/// The query marker the jet-engine listing plugin uses for its filter.
const JET_QUERY: &str = "jsf=jet-engine:press-list";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationShape {
    /// `?page=N`, or `&page=N` when `url_base` already has a query.
    PageQuery,
    /// Drupal's zero-indexed `?page=N-1`: page 1 is `?page=0`.
    ZeroBasedPageQuery,
    /// `?PageNum_rs=N`; an existing `PageNum_rs` value is replaced.
    PageNumRs,
    /// Jet Engine listings: `&pagenum=N` after a `?jsf=` marker, a
    /// `/pagenum/N/` path segment, or the compound `jsf=...&pagenum=N` query.
    JetEngine,
}

impl PaginationShape {
    /// Build the request URL for `page`.
    pub fn request_url(self, url_base: &str, page: u32) -> String {
        match self {
            PaginationShape::PageQuery => append_query(url_base, &format!("page={page}")),
            PaginationShape::ZeroBasedPageQuery => {
                append_query(url_base, &format!("page={}", page.saturating_sub(1)))
            }
            PaginationShape::PageNumRs => {
                if PAGENUM_RS.is_match(url_base) {
                    PAGENUM_RS
                        .replace(url_base, format!("PageNum_rs={page}"))
                        .into_owned()
                } else {
                    append_query(url_base, &format!("PageNum_rs={page}"))
                }
            }
            PaginationShape::JetEngine => jet_engine_url(url_base, page),
        }
    }
}

fn append_query(url: &str, pair: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{pair}")
}

fn jet_engine_url(url_base: &str, page: u32) -> String {
    if url_base.contains("?jsf=") {
        format!("{url_base}&pagenum={page}")
    } else if url_base.contains("/pagenum/") {
        if PAGENUM_SEGMENT.is_match(url_base) {
            PAGENUM_SEGMENT
                .replace(url_base, format!("/pagenum/{page}/"))
                .into_owned()
        } else {
            // `/pagenum/` with no numeric segment after it.
            format!("{}/pagenum/{page}/", url_base.trim_end_matches('/').trim_end_matches("/pagenum"))
        }
    } else if url_base.ends_with("/page/") {
        format!("{url_base}{page}/")
    } else if url_base.contains("/jsf/") {
        format!("{url_base}/pagenum/{page}/")
    } else {
        append_query(url_base, &format!("{JET_QUERY}&pagenum={page}"))
    }
}
