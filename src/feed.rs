//! RSS and Atom feed collection.
//!
//! Some offices publish a syndication feed instead of (or next to) an HTML
//! listing. Feeds go through the strict XML parser: malformed documents and
//! HTML pages served at a feed URL are errors, not empty feeds.

use itertools::Itertools;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{info, instrument, warn};
use url::Url;

use crate::dates::resolve_feed_date;
use crate::error::{Result, StatementError};
use crate::fetch::Fetch;
use crate::models::{Batch, PressRelease};
use crate::urls::{absolute_link, domain_of, remove_generic_urls};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedKind {
    Rss,
    Atom,
}

impl FeedKind {
    fn from_root(name: &str) -> Option<Self> {
        match name {
            "rss" | "rdf" => Some(FeedKind::Rss),
            "feed" => Some(FeedKind::Atom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Link,
    Title,
    Published,
    Updated,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "link" => Some(Field::Link),
            "title" => Some(Field::Title),
            "pubdate" | "published" => Some(Field::Published),
            "updated" | "date" => Some(Field::Updated),
            _ => None,
        }
    }
}

/// One `<item>` or `<entry>` being assembled.
#[derive(Debug, Default)]
struct Entry {
    link: Option<String>,
    link_is_alternate: bool,
    title: String,
    published: Option<String>,
    updated: Option<String>,
}

impl Entry {
    fn offer_link(&mut self, href: &str, rel: Option<&str>) {
        let href = href.trim();
        if href.is_empty() {
            return;
        }
        let alternate = matches!(rel, None | Some("alternate"));
        if self.link.is_none() || (alternate && !self.link_is_alternate) {
            self.link = Some(href.to_string());
            self.link_is_alternate = alternate;
        }
    }

    fn offer_link_element(&mut self, element: &BytesStart<'_>) {
        let mut href = None;
        let mut rel = None;
        for attr in element.attributes().flatten() {
            let value = attr.unescape_value().ok().map(|v| v.into_owned());
            match attr.key.local_name().as_ref() {
                b"href" => href = value,
                b"rel" => rel = value,
                _ => {}
            }
        }
        if let Some(href) = href {
            self.offer_link(&href, rel.as_deref());
        }
    }

    fn set(&mut self, field: Field, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match field {
            Field::Link => self.offer_link(text, None),
            Field::Title if self.title.is_empty() => {
                self.title = text.split_whitespace().join(" ");
            }
            Field::Title => {}
            Field::Published => {
                self.published.get_or_insert_with(|| text.to_string());
            }
            Field::Updated => {
                self.updated.get_or_insert_with(|| text.to_string());
            }
        }
    }

    fn into_release(self, feed_url: &Url, source: &str, domain: &str) -> Option<PressRelease> {
        let link = self.link?;
        if self.title.is_empty() {
            return None;
        }
        let date = self
            .published
            .or(self.updated)
            .and_then(|text| resolve_feed_date(&text));
        Some(PressRelease::new(
            source,
            absolute_link(feed_url, &link),
            self.title,
            date,
            domain,
        ))
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// Parse an RSS 2.0, RSS 1.0 (RDF) or Atom document fetched from `source`.
///
/// Items without a link or title are skipped. Relative links resolve against
/// the feed URL. RSS results drop bare `/news` landing-page links.
pub fn parse_feed(xml: &str, source: &str) -> Result<Vec<PressRelease>> {
    let feed_url = Url::parse(source)
        .map_err(|e| StatementError::feed(source, format!("invalid feed URL: {e}")))?;
    let domain = domain_of(&feed_url);

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut kind: Option<FeedKind> = None;
    let mut depth = 0usize;
    let mut current: Option<Entry> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut releases = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = local_name(e.local_name().as_ref());
                if kind.is_none() {
                    kind = Some(FeedKind::from_root(&name).ok_or_else(|| {
                        StatementError::feed(source, format!("unexpected root element <{name}>"))
                    })?);
                    continue;
                }
                match name.as_str() {
                    "item" | "entry" => {
                        current = Some(Entry::default());
                        field = None;
                    }
                    _ => {
                        if let Some(entry) = current.as_mut() {
                            field = Field::from_name(&name);
                            text.clear();
                            if name == "link" {
                                entry.offer_link_element(&e);
                            }
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(e.local_name().as_ref());
                if kind.is_none() {
                    kind = Some(FeedKind::from_root(&name).ok_or_else(|| {
                        StatementError::feed(source, format!("unexpected root element <{name}>"))
                    })?);
                    continue;
                }
                if name == "link" {
                    if let Some(entry) = current.as_mut() {
                        entry.offer_link_element(&e);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() {
                    let unescaped = e.unescape().map_err(|err| {
                        StatementError::feed(source, format!("bad character data: {err}"))
                    })?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                let name = local_name(e.local_name().as_ref());
                match name.as_str() {
                    "item" | "entry" => {
                        if let Some(release) = current
                            .take()
                            .and_then(|entry| entry.into_release(&feed_url, source, &domain))
                        {
                            releases.push(release);
                        }
                    }
                    _ => {
                        if let (Some(f), Some(entry)) = (field.take(), current.as_mut()) {
                            entry.set(f, &text);
                        }
                        text.clear();
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(StatementError::feed(
                    source,
                    format!("malformed XML at byte {}: {e}", reader.buffer_position()),
                ));
            }
            _ => {}
        }
    }

    let Some(kind) = kind else {
        return Err(StatementError::feed(source, "document has no root element"));
    };
    if depth != 0 {
        return Err(StatementError::feed(source, "document ended inside an element"));
    }

    Ok(match kind {
        FeedKind::Rss => remove_generic_urls(releases),
        FeedKind::Atom => releases,
    })
}

/// Fetch and parse one feed.
#[instrument(level = "info", skip(fetcher))]
pub async fn from_rss<F: Fetch>(fetcher: &F, url: &str) -> Result<Vec<PressRelease>> {
    let xml = fetcher
        .open_xml(url)
        .await
        .ok_or_else(|| StatementError::feed(url, "fetch failed or returned HTML"))?;
    let releases = parse_feed(&xml, url)?;
    info!(%url, count = releases.len(), "parsed feed");
    Ok(releases)
}

/// Collect several feeds. A feed that cannot be fetched, cannot be parsed or
/// yields no items is listed in `failures`; the others are kept.
#[instrument(level = "info", skip_all, fields(feeds = urls.len()))]
pub async fn batch<F: Fetch>(fetcher: &F, urls: &[String]) -> Batch {
    let mut batch = Batch::default();
    for url in urls {
        match from_rss(fetcher, url).await {
            Ok(releases) if !releases.is_empty() => batch.results.extend(releases),
            Ok(_) => {
                warn!(%url, "feed had no items");
                batch.failures.push(url.clone());
            }
            Err(e) => {
                warn!(%url, error = %e, "feed failed");
                batch.failures.push(url.clone());
            }
        }
    }
    info!(
        records = batch.results.len(),
        failures = batch.failures.len(),
        "feed batch complete"
    );
    batch
}
