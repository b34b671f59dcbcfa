//! Error types for loading configuration, registries and feeds.
//!
//! Extraction itself never fails outward: fetch and parse problems on the
//! scraping path degrade to fewer records. [`StatementError`] covers the
//! boundaries where a caller does need to know why something was rejected.

use std::path::PathBuf;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    /// Settings file could not be parsed or validated.
    #[error("config error: {message}")]
    Config { message: String },

    /// Site registry is malformed (duplicate id, bad URL, unknown pattern).
    #[error("registry error: {message}")]
    Registry { message: String },

    /// HTTP client construction failed.
    #[error("network error: {0}")]
    Network(String),

    /// Feed document could not be fetched or parsed.
    #[error("feed error for {url}: {message}")]
    Feed { url: String, message: String },

    /// A pattern name outside the six known layouts.
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    /// Records could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StatementError>;

impl StatementError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry {
            message: msg.into(),
        }
    }

    pub fn feed(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Feed {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = StatementError::registry("duplicate site id `moran`");
        assert_eq!(err.to_string(), "registry error: duplicate site id `moran`");

        let err = StatementError::feed("https://x.senate.gov/rss", "not a feed");
        assert!(err.to_string().contains("https://x.senate.gov/rss"));

        let err = StatementError::UnknownPattern("grid_cards".into());
        assert_eq!(err.to_string(), "unknown pattern: grid_cards");
    }
}
