//! HTTP fetch layer with bounded retry.
//!
//! Everything that touches the network goes through the [`Fetch`] trait, so
//! handlers, the dispatcher and the feed collector can be driven by a stub in
//! tests. [`HttpFetcher`] is the production implementation.
//!
//! # Retry Strategy
//!
//! Transient failures (timeouts, connection errors, body read errors, 5xx)
//! are retried with exponential backoff and jitter:
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=jitter_ms)
//! ```
//!
//! Any 4xx or other non-success status is permanent and returns immediately.
//! Callers only ever see `Some(body)` or `None`.
//!
//! # Parsing Mode
//!
//! [`FetchedBody::markup`] classifies a body by its `Content-Type`, sniffing
//! the first tag when the header is missing or generic. Listing pages always
//! go through the tolerant HTML parser; [`Fetch::open_xml`] refuses bodies
//! classified as HTML, which is what a feed URL that now redirects to a
//! landing page returns.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{Rng, rng};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::Client;
use scraper::Html;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::config::FetchConfig;
use crate::error::{Result, StatementError};

const ACCEPT_MARKUP: &str =
    "text/html,application/xhtml+xml,application/rss+xml,application/atom+xml,application/xml;q=0.9,*/*;q=0.8";

/// A successfully fetched response body.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub text: String,
}

/// Which parser a fetched body is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Html,
    Xml,
}

impl FetchedBody {
    pub fn markup(&self) -> Markup {
        let mime = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("text/html" | "application/xhtml+xml") => Markup::Html,
            Some(m) if m.ends_with("/xml") || m.ends_with("+xml") => Markup::Xml,
            _ => sniff(&self.text),
        }
    }
}

fn sniff(text: &str) -> Markup {
    let head = text.trim_start_matches('\u{feff}').trim_start();
    let xml_roots = ["<?xml", "<rss", "<feed", "<rdf:RDF"];
    if xml_roots.iter().any(|root| head.starts_with(root)) {
        Markup::Xml
    } else {
        Markup::Html
    }
}

/// Source of listing pages and feed documents.
///
/// Implementors provide [`get`](Fetch::get); the parsing entry points are
/// built on top of it.
pub trait Fetch {
    /// Fetch `url`, returning `None` on any failure.
    async fn get(&self, url: &str) -> Option<FetchedBody>;

    /// Fetch and parse a listing page with the tolerant HTML parser.
    async fn open_html(&self, url: &str) -> Option<Html> {
        let body = self.get(url).await?;
        Some(Html::parse_document(&body.text))
    }

    /// Fetch a feed document for the strict XML parser.
    ///
    /// `None` when the body is HTML rather than a feed.
    async fn open_xml(&self, url: &str) -> Option<String> {
        let body = self.get(url).await?;
        match body.markup() {
            Markup::Xml => Some(body.text),
            Markup::Html => {
                warn!(
                    %url,
                    final_url = %body.url,
                    content_type = ?body.content_type,
                    "expected a feed document, got HTML"
                );
                None
            }
        }
    }
}

/// Observable fetch lifecycle, delivered to an optional hook.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    Attempt {
        url: String,
        attempt: u32,
    },
    Retrying {
        url: String,
        attempt: u32,
        delay: Duration,
        reason: String,
    },
    Succeeded {
        url: String,
        attempts: u32,
        status: u16,
    },
    GaveUp {
        url: String,
        attempts: u32,
        reason: String,
    },
}

/// Callback receiving every [`FetchEvent`].
pub type FetchHook = Arc<dyn Fn(&FetchEvent) + Send + Sync>;

/// Backoff parameters for transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter_ms: config.jitter_ms,
        }
    }

    /// Delay before retrying after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=self.jitter_ms);
        delay + Duration::from_millis(jitter_ms)
    }
}

enum AttemptError {
    Transient(String),
    Permanent(String),
}

/// reqwest-backed [`Fetch`] implementation.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
    hook: Option<FetchHook>,
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("policy", &self.policy)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl HttpFetcher {
    /// Build a fetcher from the `fetch:` settings section.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .redirect(Policy::limited(5))
            .build()
            .map_err(|e| StatementError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            policy: RetryPolicy::from_config(config),
            hook: None,
        })
    }

    /// Attach a diagnostics hook.
    pub fn with_hook(mut self, hook: FetchHook) -> Self {
        self.hook = Some(hook);
        self
    }

    fn emit(&self, event: FetchEvent) {
        if let Some(hook) = &self.hook {
            hook(&event);
        }
    }

    async fn attempt(&self, url: &str) -> std::result::Result<FetchedBody, AttemptError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_MARKUP)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() || e.is_redirect() {
                    AttemptError::Permanent(e.to_string())
                } else if e.is_timeout() {
                    AttemptError::Transient(format!("timed out: {e}"))
                } else {
                    AttemptError::Transient(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AttemptError::Transient(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(AttemptError::Permanent(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let final_url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| AttemptError::Transient(format!("failed reading body: {e}")))?;

        Ok(FetchedBody {
            url: final_url,
            status: status.as_u16(),
            content_type,
            text,
        })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Option<FetchedBody> {
        let total_t0 = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.emit(FetchEvent::Attempt {
                url: url.to_string(),
                attempt,
            });

            let attempt_t0 = Instant::now();
            match self.attempt(url).await {
                Ok(body) => {
                    debug!(
                        %url,
                        attempt,
                        status = body.status,
                        bytes = body.text.len(),
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        "fetched"
                    );
                    self.emit(FetchEvent::Succeeded {
                        url: url.to_string(),
                        attempts: attempt,
                        status: body.status,
                    });
                    return Some(body);
                }
                Err(AttemptError::Permanent(reason)) => {
                    warn!(%url, attempt, error = %reason, "fetch failed permanently; not retrying");
                    self.emit(FetchEvent::GaveUp {
                        url: url.to_string(),
                        attempts: attempt,
                        reason,
                    });
                    return None;
                }
                Err(AttemptError::Transient(reason)) => {
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.policy.max_retries {
                        error!(
                            %url,
                            attempt,
                            max = self.policy.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %reason,
                            "fetch exhausted retries"
                        );
                        self.emit(FetchEvent::GaveUp {
                            url: url.to_string(),
                            attempts: attempt,
                            reason,
                        });
                        return None;
                    }

                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        %url,
                        attempt,
                        max = self.policy.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %reason,
                        "fetch attempt failed; backing off"
                    );
                    self.emit(FetchEvent::Retrying {
                        url: url.to_string(),
                        attempt,
                        delay,
                        reason,
                    });
                    sleep(delay).await;
                }
            }
        }
    }
}
