//! URL normalization helpers shared by the handlers and the feed parser.

use url::Url;

use crate::models::PressRelease;

/// Resolve an extracted `href` into an absolute URL.
///
/// A reference that already carries a scheme is returned untouched. Anything
/// else is resolved against the scheme and host (and port) of `base`, so
/// `/press/123` on `https://x.senate.gov/press` becomes
/// `https://x.senate.gov/press/123`.
pub fn absolute_link(base: &Url, href: &str) -> String {
    let href = href.trim();
    if Url::parse(href).is_ok() {
        return href.to_string();
    }

    let mut origin = base.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);

    match origin.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => format!("{}{}", base.origin().ascii_serialization(), href),
    }
}

/// Hostname of a listing URL, used as the record's `domain`.
pub fn domain_of(url: &Url) -> String {
    url.host_str().unwrap_or_default().to_string()
}

/// Drop records that point at a bare `/news` landing page instead of a release.
pub fn remove_generic_urls(results: Vec<PressRelease>) -> Vec<PressRelease> {
    results
        .into_iter()
        .filter(|release| match Url::parse(&release.url) {
            Ok(url) => !matches!(url.path(), "/news" | "/news/"),
            Err(_) => true,
        })
        .collect()
}
