//! Runtime settings.
//!
//! Settings live in an optional YAML file passed with `--config`. Every field
//! has a default; without a file the fetcher uses those defaults and the
//! built-in site registry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatementError};

/// Top-level settings, deserialized from YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP fetch behaviour.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Optional path to a site registry file. `None` uses the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<PathBuf>,
}

/// `fetch:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubles on every retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Backoff ceiling.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Upper bound of the random jitter added to each delay.
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    /// Client identification sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter_ms: default_jitter_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    500
}
fn default_max_delay_ms() -> u64 {
    4_000
}
fn default_jitter_ms() -> u64 {
    250
}
fn default_user_agent() -> String {
    concat!(
        "statement_scraper/",
        env!("CARGO_PKG_VERSION"),
        " (press release collector)"
    )
    .into()
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| StatementError::io(path, e))?;
        let settings: Settings = serde_yaml::from_str(&content).map_err(|e| {
            StatementError::config(format!("failed to parse {}: {e}", path.display()))
        })?;
        settings.validate()?;
        tracing::debug!(?path, "loaded settings");
        Ok(settings)
    }

    /// Load from `path` if given, otherwise return defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.fetch.timeout_ms == 0 {
            return Err(StatementError::config("fetch.timeout_ms must be positive"));
        }
        if self.fetch.max_delay_ms < self.fetch.base_delay_ms {
            return Err(StatementError::config(
                "fetch.max_delay_ms must not be smaller than fetch.base_delay_ms",
            ));
        }
        Ok(())
    }
}
