//! Hyperlink scraping fallback
//!
//! This module handles parsing HTML pages to extract candidate links:
//! - Anchor selection, either navigation regions only or every anchor
//! - Resolution of relative hrefs against the page URL
//! - Same-site scoping and the ignore list
//! - Optional depth-bounded link following

use crate::config::{DiscoveryConfig, FilterConfig, LinkScope};
use crate::discovery::http::HttpGet;
use crate::discovery::{CandidateSet, EmptyReason, Resolution};
use crate::url::{is_same_domain, normalize_candidate};
use crate::DiscoveryError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Substrings that drop a scraped link: social platforms, auth actions and
/// anchor/script pseudo-links
pub const DEFAULT_IGNORED_LINK_PATTERNS: &[&str] = &[
    "login",
    "logout",
    "signin",
    "signup",
    "whatsapp",
    "facebook",
    "twitter",
    "linkedin",
    "instagram",
    "youtube",
    "tiktok",
    "pinterest",
    "mailto:",
    "tel:",
    "javascript:",
    "#",
];

/// Class-name tokens marking a container as navigation
pub const DEFAULT_NAVIGATION_CLASSES: &[&str] = &[
    "nav",
    "navbar",
    "navigation",
    "menu",
    "menubar",
    "sidebar",
    "header",
    "footer",
    "breadcrumb",
    "breadcrumbs",
    "toc",
    "sitemap",
];

/// Elements that are navigation regions by tag name alone
const NAVIGATION_TAGS: &[&str] = &["nav", "header", "footer", "aside"];

/// Returns true if the element is a navigation region
///
/// Class attributes are split into tokens and each token into its `-`/`_`
/// separated parts, so `main-menu` and `site_navbar` match while
/// `unavailable` does not.
fn is_navigation_region(element: &ElementRef, navigation_classes: &[String]) -> bool {
    let value = element.value();

    if NAVIGATION_TAGS.contains(&value.name()) {
        return true;
    }

    if value
        .attr("role")
        .is_some_and(|role| role.eq_ignore_ascii_case("navigation"))
    {
        return true;
    }

    value.classes().any(|class| {
        class
            .split(['-', '_'])
            .any(|part| navigation_classes.iter().any(|nav| part.eq_ignore_ascii_case(nav)))
    })
}

/// Extracts absolute http(s) links from an HTML page
///
/// With [`LinkScope::NavigationOnly`] only anchors with a navigation-region
/// ancestor are considered. Anchors carrying a `download` attribute are
/// skipped. Results keep document order and may contain duplicates.
///
/// # Example
///
/// ```
/// use site_harvest::config::LinkScope;
/// use site_harvest::discovery::extract_links;
/// use url::Url;
///
/// let html = r#"<nav><a href="/docs/">Docs</a></nav><main><a href="/other">Other</a></main>"#;
/// let page = Url::parse("https://example.com/").unwrap();
/// let nav = vec!["menu".to_string()];
///
/// assert_eq!(
///     extract_links(html, &page, LinkScope::NavigationOnly, &nav),
///     vec!["https://example.com/docs/"]
/// );
/// assert_eq!(extract_links(html, &page, LinkScope::AllAnchors, &nav).len(), 2);
/// ```
pub fn extract_links(
    html: &str,
    page_url: &Url,
    scope: LinkScope,
    navigation_classes: &[String],
) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchors = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&anchors)
        .filter(|anchor| anchor.value().attr("download").is_none())
        .filter(|anchor| match scope {
            LinkScope::AllAnchors => true,
            LinkScope::NavigationOnly => anchor
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| is_navigation_region(&ancestor, navigation_classes)),
        })
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| normalize_candidate(href, Some(page_url)).ok())
        .collect()
}

/// Scrapes same-site links from HTML pages
#[derive(Clone)]
pub struct HyperlinkScraper {
    http: Arc<dyn HttpGet>,
    scope: LinkScope,
    max_depth: u32,
    follow_links: bool,
    ignored_patterns: Vec<String>,
    navigation_classes: Vec<String>,
}

impl HyperlinkScraper {
    pub fn new(http: Arc<dyn HttpGet>, discovery: &DiscoveryConfig, filters: &FilterConfig) -> Self {
        Self {
            http,
            scope: discovery.scope,
            max_depth: discovery.max_depth,
            follow_links: discovery.follow_links,
            ignored_patterns: filters
                .ignored_link_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            navigation_classes: filters.navigation_classes.clone(),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Returns true if a resolved link belongs to the site and is not ignored
    pub fn keep_link(&self, base_url: &str, link: &str) -> bool {
        let lower = link.to_lowercase();
        (lower.starts_with("http://") || lower.starts_with("https://"))
            && !self
                .ignored_patterns
                .iter()
                .any(|pattern| lower.contains(pattern.as_str()))
            && is_same_domain(base_url, link)
    }

    /// Extracts candidate links reachable from `base_url`
    ///
    /// Returns `Empty(DepthExceeded)` without any request when
    /// `current_depth > max_depth`. Otherwise the page is fetched and its
    /// links collected; when link following is enabled each newly found
    /// link is scraped in turn, one hop deeper, until `max_depth` is passed.
    /// Pages that fail to load are logged and skipped; only a failure of the
    /// starting page is reported in the resolution.
    pub async fn extract_hrefs(&self, base_url: &str, current_depth: u32) -> Resolution {
        if current_depth > self.max_depth {
            tracing::debug!(
                "Not scraping {}: depth {} exceeds {}",
                base_url,
                current_depth,
                self.max_depth
            );
            return Resolution::Empty(EmptyReason::DepthExceeded);
        }

        tracing::info!("Falling back to href extraction...");

        let mut found = CandidateSet::new();
        let mut visited = HashSet::new();
        let mut frontier = vec![base_url.to_string()];
        let mut depth = current_depth;
        let mut start_error = None;

        while !frontier.is_empty() && depth <= self.max_depth {
            let mut next = Vec::new();

            for page in frontier {
                if !visited.insert(page.clone()) {
                    continue;
                }

                match self.scrape_page(&page).await {
                    Ok(links) => {
                        for link in links {
                            if self.keep_link(base_url, &link) && found.insert(link.clone()) {
                                next.push(link);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Error during href extraction from {}: {}", page, e);
                        if depth == current_depth {
                            start_error = Some(e);
                        }
                    }
                }
            }

            if !self.follow_links {
                break;
            }
            frontier = next;
            depth += 1;
        }

        tracing::info!("Found {} URLs from href extraction", found.len());

        match start_error {
            Some(e) if found.is_empty() => Resolution::failed(e),
            _ => Resolution::from_set(found),
        }
    }

    /// Fetches one page and returns every link on it within scope
    async fn scrape_page(&self, page: &str) -> Result<Vec<String>, DiscoveryError> {
        let page_url = Url::parse(page).map_err(|e| DiscoveryError::Parse {
            origin: page.to_string(),
            message: e.to_string(),
        })?;

        let response = self.http.get(page).await?;
        if !response.is_ok() {
            return Err(DiscoveryError::NotFound {
                url: page.to_string(),
                status: response.status_code,
            });
        }

        if response.is_binary() {
            tracing::debug!(
                "Skipping binary page {} ({:?})",
                page,
                response.content_type
            );
            return Ok(Vec::new());
        }

        Ok(extract_links(
            &response.body,
            &page_url,
            self.scope,
            &self.navigation_classes,
        ))
    }
}
