//! URL discovery for a single site
//!
//! This module contains the resolvers that work out which URLs a site has:
//! - Sitemap lookup at well-known locations (with sitemap-index recursion)
//! - Sitemap pointers declared in robots.txt
//! - Hyperlink scraping of the seed page, optionally depth-bounded recursive
//!
//! The [`Discoverer`] tries them in that order and stops at the first one that
//! yields URLs.

pub mod http;
pub mod links;
mod orchestrator;
pub mod robots;
pub mod sitemap;

pub use http::{build_http_client, HttpClient, HttpGet, HttpResponse};
pub use links::{extract_links, HyperlinkScraper};
pub use orchestrator::{Discoverer, Discovery, DiscoverySource};
pub use robots::{find_sitemap_directive, RobotsResolver};
pub use sitemap::{parse_sitemap, SitemapDocument, SitemapResolver};

use crate::config::Config;
use crate::{DiscoveryError, HarvestError};
use std::collections::HashSet;
use std::fmt;

/// Unique candidate URLs produced by one resolver
pub type CandidateSet = HashSet<String>;

/// Why a resolver produced no URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The source does not exist (no sitemap at any location, no robots.txt
    /// sitemap line)
    NotPresent,
    /// The source was read but listed no usable URLs
    NoUrls,
    /// Hyperlink scraping was asked to start past its depth budget
    DepthExceeded,
    /// Fetching or parsing the source failed
    Failed(DiscoveryError),
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPresent => write!(f, "source not present"),
            Self::NoUrls => write!(f, "no URLs listed"),
            Self::DepthExceeded => write!(f, "depth budget exceeded"),
            Self::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Outcome of one discovery strategy
///
/// Resolvers never return errors; a failed strategy is an empty resolution
/// that remembers why, so the orchestrator can fall through while callers
/// can still tell "nothing there" from "broken".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(CandidateSet),
    Empty(EmptyReason),
}

impl Resolution {
    /// Wraps a set, turning an empty one into `Empty(NoUrls)`
    pub fn from_set(urls: CandidateSet) -> Self {
        if urls.is_empty() {
            Self::Empty(EmptyReason::NoUrls)
        } else {
            Self::Found(urls)
        }
    }

    pub fn failed(error: DiscoveryError) -> Self {
        Self::Empty(EmptyReason::Failed(error))
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The reason this resolution is empty, if it is
    pub fn reason(&self) -> Option<&EmptyReason> {
        match self {
            Self::Found(_) => None,
            Self::Empty(reason) => Some(reason),
        }
    }

    /// The discovered URLs; empty for every `Empty` variant
    pub fn into_urls(self) -> CandidateSet {
        match self {
            Self::Found(urls) => urls,
            Self::Empty(_) => CandidateSet::new(),
        }
    }
}

/// Discovers the URLs of a site with a fresh HTTP client
///
/// Convenience wrapper around [`Discoverer`] for one-off calls.
///
/// # Example
///
/// ```no_run
/// use site_harvest::config::Config;
/// use site_harvest::discovery::get_all_urls;
///
/// # async fn example() -> site_harvest::Result<()> {
/// let urls = get_all_urls("https://example.edu", &Config::default()).await?;
/// println!("{} URLs", urls.len());
/// # Ok(())
/// # }
/// ```
pub async fn get_all_urls(base_url: &str, config: &Config) -> Result<Vec<String>, HarvestError> {
    let discoverer = Discoverer::new(config)?;
    Ok(discoverer.get_all_urls(base_url).await)
}
