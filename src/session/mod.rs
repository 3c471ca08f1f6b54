//! Crawl session - fetching every discovered URL
//!
//! This module drives a page fetcher over a list of URLs:
//! - One session identifier shared by every fetch in the batch
//! - Sequential fetching by default, or a bounded pool
//! - Per-URL failures recorded, never aborting the batch
//! - A [`CrawlReport`] built once every fetch has finished

pub mod fetcher;
mod report;

pub use crate::config::{CacheMode, FetchConfig};
pub use fetcher::{render_page, HttpPageFetcher, RenderedPage};
pub use report::{
    print_summary, CrawlMetadata, CrawlReport, PageData, PageMetadata, PageRecord, PageStatus,
};

use crate::config::Config;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

/// A link found on a fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub href: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Result of fetching one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success {
        markdown: String,
        links: Vec<PageLink>,
    },
    Failure {
        error_message: String,
    },
}

impl FetchOutcome {
    pub fn failure(error_message: impl Into<String>) -> Self {
        Self::Failure {
            error_message: error_message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn markdown(&self) -> Option<&str> {
        match self {
            Self::Success { markdown, .. } => Some(markdown),
            Self::Failure { .. } => None,
        }
    }

    pub fn links(&self) -> &[PageLink] {
        match self {
            Self::Success { links, .. } => links,
            Self::Failure { .. } => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_message } => Some(error_message),
        }
    }
}

/// Fetches and renders a page
///
/// Implementations report every problem through
/// [`FetchOutcome::Failure`]; a fetch never aborts the session.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, config: &FetchConfig, session_id: &str) -> FetchOutcome;
}

/// Generates a session identifier from the current UTC time
pub fn generate_session_id() -> String {
    format!("session-{}", Utc::now().format("%Y%m%dT%H%M%SZ"))
}

/// Drives a [`PageFetcher`] over a batch of URLs
pub struct CrawlSession<F> {
    fetcher: F,
    fetch_config: FetchConfig,
    session_id: String,
    concurrency: usize,
    record_successes: bool,
}

impl<F: PageFetcher> CrawlSession<F> {
    /// Creates a sequential session that records failures only
    pub fn new(fetcher: F, fetch_config: FetchConfig, session_id: impl Into<String>) -> Self {
        Self {
            fetcher,
            fetch_config,
            session_id: session_id.into(),
            concurrency: 1,
            record_successes: false,
        }
    }

    /// Creates a session from the `[fetch]` and `[output]` settings
    ///
    /// Without a configured `session-id` one is generated from the clock.
    pub fn from_config(fetcher: F, config: &Config) -> Self {
        let session_id = config
            .output
            .session_id
            .clone()
            .unwrap_or_else(generate_session_id);

        Self::new(fetcher, config.fetch.clone(), session_id)
            .with_concurrency(config.output.concurrency)
            .with_record_successes(config.output.record_successes)
    }

    /// Sets how many pages are fetched at once; 0 is treated as 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_record_successes(mut self, record_successes: bool) -> Self {
        self.record_successes = record_successes;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches every URL and reports the results
    ///
    /// Outcomes are collected in input order whatever the concurrency. The
    /// totals are computed only after the last fetch has finished.
    pub async fn crawl_urls(&self, urls: &[String]) -> CrawlReport {
        tracing::info!(
            "Crawling {} URLs in session {} (concurrency {})",
            urls.len(),
            self.session_id,
            self.concurrency
        );

        let outcomes: Vec<_> = stream::iter(urls)
            .map(|url| async move {
                let outcome = self
                    .fetcher
                    .fetch(url, &self.fetch_config, &self.session_id)
                    .await;
                (url, outcome, Utc::now())
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = CrawlReport::new(self.session_id.clone());
        let mut successful = 0;

        for (url, outcome, finished_at) in outcomes {
            match outcome {
                FetchOutcome::Success { .. } => {
                    tracing::info!("Successfully crawled: {}", url);
                    successful += 1;
                    if self.record_successes {
                        report.record(url, PageStatus::Success, None, finished_at);
                    }
                }
                FetchOutcome::Failure { error_message } => {
                    tracing::warn!("Failed: {} - Error: {}", url, error_message);
                    report.record(url, PageStatus::Failed, Some(error_message), finished_at);
                }
            }
        }

        report.crawl_metadata.total_urls = urls.len();
        report.crawl_metadata.successful_crawls = successful;

        tracing::info!(
            "Session {} finished: {}/{} pages crawled",
            self.session_id,
            successful,
            urls.len()
        );

        report
    }
}
