//! Crawl report persisted at the end of a session
//!
//! This module handles:
//! - The JSON document shape (`crawl_metadata` plus per-URL `crawled_pages`)
//! - Writing the report to disk
//! - Printing a human-readable summary

use crate::HarvestError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use url::Url;

/// Outcome of one page in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Success,
    Failed,
}

/// Aggregate counts for the whole session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlMetadata {
    /// Number of URLs handed to the session
    pub total_urls: usize,

    /// Number of fetches that succeeded
    pub successful_crawls: usize,

    pub session_id: String,
}

/// Per-page bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// RFC 3339 time the fetch finished
    pub crawl_timestamp: String,
    pub session_id: String,
    pub status: PageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where the page lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    pub url: String,
    pub path: String,
    /// Host with explicit port, as written in the URL
    pub domain: String,
}

impl PageData {
    /// Splits a URL into its path and domain; unparseable URLs keep both empty
    pub fn from_url(url: &str) -> Self {
        let (path, domain) = match Url::parse(url) {
            Ok(parsed) => {
                let host = parsed.host_str().unwrap_or_default();
                let domain = match parsed.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                };
                (parsed.path().to_string(), domain)
            }
            Err(_) => (String::new(), String::new()),
        };

        Self {
            url: url.to_string(),
            path,
            domain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub metadata: PageMetadata,
    pub page_data: PageData,
}

/// Everything a crawl session reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub crawl_metadata: CrawlMetadata,
    /// Recorded pages keyed by URL
    pub crawled_pages: BTreeMap<String, PageRecord>,
}

impl CrawlReport {
    /// Creates an empty report for a session
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            crawl_metadata: CrawlMetadata {
                total_urls: 0,
                successful_crawls: 0,
                session_id: session_id.into(),
            },
            crawled_pages: BTreeMap::new(),
        }
    }

    /// Records one page; a later record for the same URL replaces the earlier one
    pub fn record(
        &mut self,
        url: &str,
        status: PageStatus,
        error: Option<String>,
        finished_at: DateTime<Utc>,
    ) {
        let record = PageRecord {
            metadata: PageMetadata {
                crawl_timestamp: finished_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                session_id: self.crawl_metadata.session_id.clone(),
                status,
                error,
            },
            page_data: PageData::from_url(url),
        };
        self.crawled_pages.insert(url.to_string(), record);
    }

    /// Number of failed fetches
    pub fn failed_crawls(&self) -> usize {
        self.crawl_metadata
            .total_urls
            .saturating_sub(self.crawl_metadata.successful_crawls)
    }

    pub fn to_json(&self) -> Result<String, HarvestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report as pretty-printed JSON, replacing any existing file
    pub fn write_report(&self, path: &Path) -> Result<(), HarvestError> {
        fs::write(path, self.to_json()?)?;
        tracing::info!("Crawl report written to {}", path.display());
        Ok(())
    }
}

/// Prints a crawl report summary to stdout
pub fn print_summary(report: &CrawlReport) {
    let meta = &report.crawl_metadata;

    println!("=== Crawl Summary ===\n");
    println!("Session: {}", meta.session_id);
    println!("  Total URLs: {}", meta.total_urls);

    let rate = if meta.total_urls > 0 {
        (meta.successful_crawls as f64 / meta.total_urls as f64) * 100.0
    } else {
        0.0
    };
    println!("  Successful: {} ({:.1}%)", meta.successful_crawls, rate);
    println!("  Failed: {}", report.failed_crawls());

    let failures: Vec<_> = report
        .crawled_pages
        .iter()
        .filter(|(_, record)| record.metadata.status == PageStatus::Failed)
        .collect();

    if !failures.is_empty() {
        println!("\nFailures:");
        for (url, record) in failures {
            println!(
                "  {} - {}",
                url,
                record.metadata.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
