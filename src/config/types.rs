use serde::{Deserialize, Serialize};

use crate::discovery::links::{DEFAULT_IGNORED_LINK_PATTERNS, DEFAULT_NAVIGATION_CLASSES};
use crate::discovery::sitemap::DEFAULT_SITEMAP_LOCATIONS;
use crate::url::classify::{
    DEFAULT_CONTENT_INDICATORS, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_EXCLUDED_PARAMS,
    DEFAULT_EXCLUDED_PATHS,
};

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Main configuration structure for Site-Harvest
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub filters: FilterConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Which anchors the hyperlink scraper considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkScope {
    /// Only anchors inside nav/header/footer/aside or menu-like containers
    NavigationOnly,
    /// Every anchor on the page
    AllAnchors,
}

/// URL discovery behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// Deepest hyperlink hop the scraper will follow from the seed
    pub max_depth: u32,

    /// Anchor selection policy for the hyperlink scraper
    pub scope: LinkScope,

    /// Follow scraped links recursively up to `max_depth` instead of
    /// scraping the seed page only
    pub follow_links: bool,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Maximum sub-sitemaps fetched at once from a sitemap index
    pub sitemap_concurrency: usize,

    /// Maximum sitemap-index nesting before sub-sitemaps are skipped
    pub max_sitemap_nesting: u32,

    /// Well-known sitemap paths, tried in order
    pub sitemap_locations: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            scope: LinkScope::AllAnchors,
            follow_links: false,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            sitemap_concurrency: 4,
            max_sitemap_nesting: 5,
            sitemap_locations: owned(DEFAULT_SITEMAP_LOCATIONS),
        }
    }
}

/// Heuristic lists driving the content classifier and the link scraper
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    /// Paths with more non-empty segments than this are rejected
    pub max_path_segments: usize,

    /// File extensions that never hold page content (lowercase, with dot)
    pub excluded_extensions: Vec<String>,

    /// Tracking/navigation query parameter prefixes
    pub excluded_params: Vec<String>,

    /// Path substrings marking admin, asset, auth, cart and tracking URLs
    pub excluded_paths: Vec<String>,

    /// Path substrings marking content pages
    pub content_indicators: Vec<String>,

    /// Substrings that drop a scraped href outright
    pub ignored_link_patterns: Vec<String>,

    /// Class-name tokens that mark a container as navigation
    pub navigation_classes: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_path_segments: 4,
            excluded_extensions: owned(DEFAULT_EXCLUDED_EXTENSIONS),
            excluded_params: owned(DEFAULT_EXCLUDED_PARAMS),
            excluded_paths: owned(DEFAULT_EXCLUDED_PATHS),
            content_indicators: owned(DEFAULT_CONTENT_INDICATORS),
            ignored_link_patterns: owned(DEFAULT_IGNORED_LINK_PATTERNS),
            navigation_classes: owned(DEFAULT_NAVIGATION_CLASSES),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "site-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Whether a page fetcher may reuse an earlier outcome for the same URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    #[default]
    Bypass,
    UseCache,
}

/// Run configuration handed to the page fetcher for every URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Restrict extraction to elements matching this CSS selector
    pub css_selector: Option<String>,

    /// Text blocks with fewer words than this are dropped (0 keeps all)
    pub word_count_threshold: usize,

    /// Tag names removed before extraction
    pub excluded_tags: Vec<String>,

    /// Drop links pointing off the page's domain
    pub exclude_external_links: bool,

    /// Drop links to social platforms
    pub exclude_social_media_links: bool,

    /// Host patterns (`example.com` or `*.example.com`) whose links are dropped
    pub exclude_domains: Vec<String>,

    /// Drop images hosted off the page's domain
    pub exclude_external_images: bool,

    pub cache_mode: CacheMode,
}

/// Crawl session output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the JSON crawl report
    pub path: String,

    /// Session identifier shared by every fetch in a batch
    pub session_id: Option<String>,

    /// Also record successful pages (metadata only) in the report
    pub record_successes: bool,

    /// Number of pages fetched at once (1 = sequential)
    pub concurrency: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "crawl_results.json".to_string(),
            session_id: None,
            record_successes: false,
            concurrency: 1,
        }
    }
}
