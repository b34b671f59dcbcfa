//! Site registry: which layout pattern each site uses and where its listing lives.
//!
//! The registry is an explicit value handed to the [`Scraper`](crate::scraper::Scraper),
//! so tests and production can run against different site lists. The built-in
//! list is compiled from `registry/sites.yaml`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, StatementError};

const BUILTIN_SITES: &str = include_str!("../registry/sites.yaml");

/// The six reusable listing layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    TableRecordlistDate,
    JetListingElementor,
    ArticleBlockH2PDate,
    TableTime,
    ElementPostMedia,
    MediaBody,
}

impl Pattern {
    /// All patterns, in bulk-run order.
    pub const ALL: [Pattern; 6] = [
        Pattern::TableRecordlistDate,
        Pattern::JetListingElementor,
        Pattern::ArticleBlockH2PDate,
        Pattern::TableTime,
        Pattern::ElementPostMedia,
        Pattern::MediaBody,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Pattern::TableRecordlistDate => "table_recordlist_date",
            Pattern::JetListingElementor => "jet_listing_elementor",
            Pattern::ArticleBlockH2PDate => "article_block_h2_p_date",
            Pattern::TableTime => "table_time",
            Pattern::ElementPostMedia => "element_post_media",
            Pattern::MediaBody => "media_body",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = StatementError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Pattern::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| StatementError::UnknownPattern(s.to_string()))
    }
}

/// Configuration for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub pattern: Pattern,
    /// Canonical listing URL without pagination parameters.
    pub url_base: String,
    /// Committee party tag carried onto every record from this site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
}

/// One entry of a registry file.
#[derive(Debug, Deserialize)]
struct RegistryEntry {
    id: String,
    #[serde(flatten)]
    site: SiteConfig,
}

/// Immutable lookup table from site identifier to [`SiteConfig`].
///
/// Entries keep the order they were declared in, which is the order bulk
/// runs visit them.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<(String, SiteConfig)>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// The compiled-in registry of known government sites.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_SITES)
    }

    /// Parse a registry from YAML: a sequence of `{id, pattern, url_base, party?}`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let entries: Vec<RegistryEntry> = serde_yaml::from_str(yaml)
            .map_err(|e| StatementError::registry(format!("invalid registry: {e}")))?;
        Self::from_entries(entries.into_iter().map(|e| (e.id, e.site)))
    }

    /// Load a registry file from disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| StatementError::io(path, e))?;
        let registry = Self::from_yaml_str(&content)?;
        tracing::info!(?path, sites = registry.len(), "loaded site registry");
        Ok(registry)
    }

    /// Build a registry from `(id, config)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, SiteConfig)>) -> Result<Self> {
        let mut registry = Registry::default();
        for (id, site) in entries {
            if Url::parse(&site.url_base).is_err() {
                return Err(StatementError::registry(format!(
                    "site `{id}` has an invalid url_base: {}",
                    site.url_base
                )));
            }
            if registry.index.contains_key(&id) {
                return Err(StatementError::registry(format!("duplicate site id `{id}`")));
            }
            registry.index.insert(id.clone(), registry.entries.len());
            registry.entries.push((id, site));
        }
        Ok(registry)
    }

    pub fn get(&self, site_id: &str) -> Option<&SiteConfig> {
        self.index.get(site_id).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, site_id: &str) -> bool {
        self.index.contains_key(site_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SiteConfig)> {
        self.entries.iter().map(|(id, site)| (id.as_str(), site))
    }

    /// Every `url_base` registered against `pattern`, in declaration order.
    pub fn urls_for(&self, pattern: Pattern) -> Vec<String> {
        self.iter()
            .filter(|(_, site)| site.pattern == pattern)
            .map(|(_, site)| site.url_base.clone())
            .collect()
    }

    /// Party tag of the first entry whose `url_base` is `url`.
    pub fn party_for(&self, url: &str) -> Option<&str> {
        self.iter()
            .find(|(_, site)| site.url_base == url)
            .and_then(|(_, site)| site.party.as_deref())
    }
}
