//! Site-Harvest: URL discovery and page retrieval for knowledge-base construction
//!
//! Given a seed domain, this crate works out which pages exist on the site
//! (sitemaps, robots.txt sitemap pointers, hyperlink scraping), filters them
//! down to content-rich URLs, and drives a page fetcher over the result while
//! tolerating per-page failures.

pub mod config;
pub mod discovery;
pub mod session;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while resolving candidate URLs for a site
///
/// Resolvers never propagate these to the orchestrator; they are carried
/// inside [`discovery::EmptyReason::Failed`] so callers can tell a broken
/// source apart from an absent one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Host unreachable, connection refused, or the request timed out
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Malformed XML or HTML
    #[error("Parse error in {origin}: {message}")]
    Parse { origin: String, message: String },

    /// Any non-200 response
    #[error("HTTP {status} for {url}")]
    NotFound { url: String, status: u16 },
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Not a navigable link: {0}")]
    NotNavigable(String),
}

/// Result type alias for Site-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use discovery::{CandidateSet, Discoverer, Discovery, DiscoverySource, EmptyReason, Resolution};
pub use session::{CrawlReport, CrawlSession, FetchConfig, FetchOutcome, PageFetcher};
pub use crate::url::{get_domain, is_content_url, is_same_domain, UrlFilter};
