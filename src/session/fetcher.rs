//! Static HTML page fetcher
//!
//! This module fetches pages over plain HTTP (no JavaScript) and turns them
//! into markdown:
//! - Scope restriction through a CSS selector
//! - Dropping excluded tags before conversion
//! - HTML to markdown through `htmd`, then a per-block word threshold
//! - Link collection with external, social and domain exclusions
//! - Optional per-URL caching

use crate::config::{CacheMode, Config, FetchConfig};
use crate::discovery::{HttpClient, HttpGet};
use crate::session::{FetchOutcome, PageFetcher, PageLink};
use crate::url::{host_matches_pattern, is_same_domain, normalize_candidate};
use crate::HarvestError;
use async_trait::async_trait;
use htmd::options::{BulletListMarker, CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

/// Tags whose content is never page text
const ALWAYS_DROPPED: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Hosts treated as social media by `exclude-social-media-links`
pub const SOCIAL_MEDIA_DOMAINS: &[&str] = &[
    "*.facebook.com",
    "*.twitter.com",
    "*.x.com",
    "*.linkedin.com",
    "*.instagram.com",
    "*.youtube.com",
    "*.tiktok.com",
    "*.pinterest.com",
    "*.reddit.com",
    "*.whatsapp.com",
    "*.snapchat.com",
    "*.tumblr.com",
];

/// Markdown and links extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub markdown: String,
    pub links: Vec<PageLink>,
}

/// Per-render state derived from the fetch configuration
struct Renderer<'a> {
    page_url: &'a Url,
    config: &'a FetchConfig,
    dropped: Vec<String>,
    converter: HtmlToMarkdown,
}

impl<'a> Renderer<'a> {
    fn new(page_url: &'a Url, config: &'a FetchConfig) -> Self {
        let mut dropped: Vec<String> = ALWAYS_DROPPED.iter().map(|t| t.to_string()).collect();
        for tag in &config.excluded_tags {
            let tag = tag.to_lowercase();
            if !dropped.contains(&tag) {
                dropped.push(tag);
            }
        }

        let mut options = Options::default();
        options.heading_style = HeadingStyle::Atx;
        options.code_block_style = CodeBlockStyle::Fenced;
        options.bullet_list_marker = BulletListMarker::Dash;

        let converter = HtmlToMarkdown::builder()
            .skip_tags(dropped.iter().map(String::as_str).collect())
            .options(options)
            .build();

        Self {
            page_url,
            config,
            dropped,
            converter,
        }
    }

    fn is_dropped(&self, element: &ElementRef) -> bool {
        let name = element.value().name();
        self.dropped.iter().any(|tag| tag == name)
    }

    /// Markup of `root` with image sources made absolute and external images
    /// removed when configured
    fn prune(&self, root: ElementRef, images: &Selector) -> String {
        let mut html = root.html();

        for image in root.select(images) {
            let original = image.html();
            let Some(src) = image
                .value()
                .attr("src")
                .and_then(|src| normalize_candidate(src, Some(self.page_url)).ok())
            else {
                html = html.replace(&original, "");
                continue;
            };

            if self.config.exclude_external_images && !is_same_domain(self.page_url.as_str(), &src)
            {
                html = html.replace(&original, "");
                continue;
            }

            let alt = image.value().attr("alt").unwrap_or_default().trim();
            let rewritten = format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape_attribute(&src),
                escape_attribute(alt)
            );
            html = html.replace(&original, &rewritten);
        }

        html
    }

    fn convert(&self, html: &str) -> Result<String, String> {
        self.converter
            .convert(html)
            .map_err(|e| format!("Markdown conversion failed: {}", e))
    }

    /// Collects the links inside `root`, honoring the link exclusions
    fn collect_links(&self, root: ElementRef, anchors: &Selector, links: &mut Vec<PageLink>) {
        let excluded_domains: Vec<String> = self
            .config
            .exclude_domains
            .iter()
            .map(|d| d.to_lowercase())
            .collect();

        for anchor in root.select(anchors) {
            let inside_dropped = anchor
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| self.is_dropped(&ancestor));
            if inside_dropped {
                continue;
            }

            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(href) = normalize_candidate(href, Some(self.page_url)) else {
                continue;
            };
            let host = Url::parse(&href)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();

            if self.config.exclude_external_links && !is_same_domain(self.page_url.as_str(), &href)
            {
                continue;
            }
            if self.config.exclude_social_media_links
                && SOCIAL_MEDIA_DOMAINS
                    .iter()
                    .any(|pattern| host_matches_pattern(pattern, &host))
            {
                continue;
            }
            if excluded_domains
                .iter()
                .any(|pattern| host_matches_pattern(pattern, &host))
            {
                continue;
            }
            if links.iter().any(|link| link.href == href) {
                continue;
            }

            links.push(PageLink {
                href,
                text: collapse_whitespace(&anchor.text().collect::<Vec<_>>().join(" ")),
                title: anchor
                    .value()
                    .attr("title")
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            });
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Drops markdown blocks with fewer words than `threshold`
///
/// Headings, images and fenced code are always kept. A threshold of zero
/// keeps every non-empty block.
pub fn apply_word_count_threshold(markdown: &str, threshold: usize) -> String {
    let mut kept = Vec::new();
    let mut in_fence = false;

    for block in markdown.split("\n\n") {
        let block = block.trim_matches('\n');
        if block.trim().is_empty() {
            continue;
        }

        let fences = block
            .lines()
            .filter(|line| line.trim_start().starts_with("```"))
            .count();
        let trimmed = block.trim_start();
        let structural =
            in_fence || fences > 0 || trimmed.starts_with('#') || trimmed.starts_with("![");
        if fences % 2 == 1 {
            in_fence = !in_fence;
        }

        if structural || block.split_whitespace().count() >= threshold {
            kept.push(block);
        }
    }

    kept.join("\n\n")
}

/// Renders an HTML page into markdown and links
///
/// # Arguments
///
/// * `html` - The page source
/// * `page_url` - Where the page was fetched from, for resolving references
/// * `config` - Extraction options
///
/// # Returns
///
/// * `Ok(RenderedPage)` - The extracted content
/// * `Err(String)` - The configured CSS selector is invalid, or conversion failed
///
/// # Example
///
/// ```
/// use site_harvest::config::FetchConfig;
/// use site_harvest::session::render_page;
/// use url::Url;
///
/// let html = "<html><body><h1>Title</h1><p>Some text here.</p></body></html>";
/// let page = Url::parse("https://example.com/").unwrap();
/// let rendered = render_page(html, &page, &FetchConfig::default()).unwrap();
/// assert!(rendered.markdown.contains("# Title"));
/// assert!(rendered.markdown.contains("Some text here."));
/// ```
pub fn render_page(
    html: &str,
    page_url: &Url,
    config: &FetchConfig,
) -> Result<RenderedPage, String> {
    let document = Html::parse_document(html);
    let anchors =
        Selector::parse("a[href]").map_err(|e| format!("Invalid anchor selector: {}", e))?;
    let images =
        Selector::parse("img").map_err(|e| format!("Invalid image selector: {}", e))?;

    let roots: Vec<ElementRef> = match &config.css_selector {
        Some(css) => {
            let selector =
                Selector::parse(css).map_err(|e| format!("Invalid CSS selector {:?}: {}", css, e))?;
            document.select(&selector).collect()
        }
        None => vec![document.root_element()],
    };

    let renderer = Renderer::new(page_url, config);
    let mut sections = Vec::new();
    let mut links = Vec::new();

    for root in roots {
        let markdown = renderer.convert(&renderer.prune(root, &images))?;
        sections.push(markdown);
        renderer.collect_links(root, &anchors, &mut links);
    }

    Ok(RenderedPage {
        markdown: apply_word_count_threshold(&sections.join("\n\n"), config.word_count_threshold),
        links,
    })
}

/// [`PageFetcher`] for static HTML over HTTP GET
pub struct HttpPageFetcher {
    http: Arc<dyn HttpGet>,
    cache: Mutex<HashMap<String, FetchOutcome>>,
}

impl HttpPageFetcher {
    pub fn new(http: Arc<dyn HttpGet>) -> Self {
        Self {
            http,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Builds the fetcher with the user-agent and timeout settings
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let http = HttpClient::from_config(&config.user_agent, &config.discovery)?;
        Ok(Self::new(Arc::new(http)))
    }

    fn cached(&self, url: &str) -> Option<FetchOutcome> {
        self.cache.lock().ok()?.get(url).cloned()
    }

    fn store(&self, url: &str, outcome: &FetchOutcome) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(url.to_string(), outcome.clone());
        }
    }

    async fn fetch_uncached(&self, url: &str, config: &FetchConfig) -> FetchOutcome {
        let page_url = match Url::parse(url) {
            Ok(page_url) => page_url,
            Err(e) => return FetchOutcome::failure(format!("Invalid URL {}: {}", url, e)),
        };

        let response = match self.http.get(url).await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::failure(e.to_string()),
        };

        if !response.is_ok() {
            return FetchOutcome::failure(format!("HTTP {}", response.status_code));
        }

        if response.is_binary() {
            return FetchOutcome::failure(format!(
                "Content type {} is not HTML",
                response.content_type.as_deref().unwrap_or("unknown")
            ));
        }

        match render_page(&response.body, &page_url, config) {
            Ok(rendered) => FetchOutcome::Success {
                markdown: rendered.markdown,
                links: rendered.links,
            },
            Err(e) => FetchOutcome::failure(e),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, config: &FetchConfig, session_id: &str) -> FetchOutcome {
        if config.cache_mode == CacheMode::UseCache {
            if let Some(outcome) = self.cached(url) {
                tracing::debug!("Cache hit for {} in session {}", url, session_id);
                return outcome;
            }
        }

        tracing::debug!("Fetching {} in session {}", url, session_id);
        let outcome = self.fetch_uncached(url, config).await;

        if config.cache_mode == CacheMode::UseCache {
            self.store(url, &outcome);
        }
        outcome
    }
}
