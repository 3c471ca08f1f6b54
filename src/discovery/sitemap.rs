//! Sitemap discovery
//!
//! Sitemaps are fetched from a fixed list of well-known locations; the first
//! location that answers HTTP 200 is the only one read. Sitemap indexes are
//! followed recursively, fetching their children with bounded fan-out and
//! merging the results by set union.

use crate::config::DiscoveryConfig;
use crate::discovery::http::HttpGet;
use crate::discovery::{CandidateSet, EmptyReason, Resolution};
use crate::url::normalize_candidate;
use crate::DiscoveryError;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::sync::Arc;
use url::Url;

/// Well-known sitemap paths, in the order they are tried
pub const DEFAULT_SITEMAP_LOCATIONS: &[&str] =
    &["/sitemap.xml", "/sitemap_index.xml", "/wp-sitemap.xml"];

/// Parsed sitemap content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// A regular sitemap listing page URLs
    UrlSet(Vec<String>),
    /// A sitemap index listing other sitemaps
    Index(Vec<String>),
}

/// Parses sitemap XML into its `<loc>` values
///
/// The root element decides the kind: a local name containing
/// `sitemapindex` is an index, anything else is a URL set. `<loc>` is
/// matched by local name, so namespaced documents work unchanged.
///
/// # Errors
///
/// Returns [`DiscoveryError::Parse`] for malformed XML, mismatched or
/// unclosed tags, text outside the root element, or a document without a
/// root element.
///
/// # Example
///
/// ```
/// use site_harvest::discovery::{parse_sitemap, SitemapDocument};
///
/// let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///     <url><loc>https://example.com/a</loc></url>
/// </urlset>"#;
/// assert_eq!(
///     parse_sitemap("inline", xml).unwrap(),
///     SitemapDocument::UrlSet(vec!["https://example.com/a".to_string()])
/// );
/// ```
pub fn parse_sitemap(origin: &str, content: &str) -> Result<SitemapDocument, DiscoveryError> {
    let parse_error = |message: String| DiscoveryError::Parse {
        origin: origin.to_string(),
        message,
    };

    // End tags are checked against their start tags by the reader itself
    let mut reader = Reader::from_str(content);
    let mut depth = 0usize;
    let mut root: Option<Vec<u8>> = None;
    let mut current_loc: Option<String> = None;
    let mut locs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_ascii_lowercase();
                if depth == 0 {
                    if root.is_some() {
                        return Err(parse_error("multiple root elements".to_string()));
                    }
                    root = Some(name.clone());
                }
                if name == b"loc" {
                    current_loc = Some(String::new());
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    if root.is_some() {
                        return Err(parse_error("multiple root elements".to_string()));
                    }
                    root = Some(e.local_name().as_ref().to_ascii_lowercase());
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                if e.local_name().as_ref().eq_ignore_ascii_case(b"loc") {
                    if let Some(loc) = current_loc.take() {
                        let loc = loc.trim();
                        if !loc.is_empty() {
                            locs.push(loc.to_string());
                        }
                    }
                }
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| parse_error(e.to_string()))?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(parse_error("text outside the root element".to_string()));
                    }
                } else if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(parse_error(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )))
            }
        }
    }

    if depth > 0 {
        return Err(parse_error(format!("{} unclosed element(s)", depth)));
    }

    let root = root.ok_or_else(|| parse_error("no root element".to_string()))?;
    if String::from_utf8_lossy(&root).contains("sitemapindex") {
        Ok(SitemapDocument::Index(locs))
    } else {
        Ok(SitemapDocument::UrlSet(locs))
    }
}

/// Normalizes `<loc>` values, dropping anything that is not an http(s) URL
fn normalize_locs(locs: Vec<String>) -> CandidateSet {
    locs.into_iter()
        .filter_map(|loc| match normalize_candidate(&loc, None) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Skipping sitemap entry {:?}: {}", loc, e);
                None
            }
        })
        .collect()
}

/// Resolves candidate URLs from XML sitemaps
#[derive(Clone)]
pub struct SitemapResolver {
    http: Arc<dyn HttpGet>,
    locations: Vec<String>,
    concurrency: usize,
    max_nesting: u32,
}

impl SitemapResolver {
    pub fn new(http: Arc<dyn HttpGet>, config: &DiscoveryConfig) -> Self {
        Self {
            http,
            locations: config.sitemap_locations.clone(),
            concurrency: config.sitemap_concurrency.max(1),
            max_nesting: config.max_sitemap_nesting,
        }
    }

    /// Tries each well-known sitemap location in order
    ///
    /// The first location answering HTTP 200 wins: its content is parsed and
    /// returned, and the remaining locations are never requested, even if
    /// the winning document turns out to be empty or malformed.
    pub async fn try_default_sitemaps(&self, base_url: &str) -> Resolution {
        tracing::info!("Attempting to fetch sitemap from default locations...");

        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                return Resolution::failed(DiscoveryError::Parse {
                    origin: base_url.to_string(),
                    message: e.to_string(),
                })
            }
        };

        let mut last_error = None;

        for location in &self.locations {
            let sitemap_url = match base.join(location) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Cannot join {} onto {}: {}", location, base, e);
                    continue;
                }
            };
            tracing::debug!("Trying sitemap at: {}", sitemap_url);

            match self.http.get(sitemap_url.as_str()).await {
                Ok(response) if response.is_ok() => {
                    tracing::info!("Successfully found sitemap at {}", sitemap_url);
                    return self
                        .extract_urls_at(sitemap_url.as_str(), &response.body)
                        .await;
                }
                Ok(response) => {
                    tracing::debug!(
                        "No sitemap at {} (HTTP {})",
                        sitemap_url,
                        response.status_code
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch sitemap from {}: {}", sitemap_url, e);
                    last_error = Some(e);
                }
            }
        }

        tracing::info!("No sitemap found in default locations");
        match last_error {
            Some(e) => Resolution::failed(e),
            None => Resolution::Empty(EmptyReason::NotPresent),
        }
    }

    /// Extracts URLs from sitemap XML, following sitemap indexes
    ///
    /// Malformed XML yields an empty resolution carrying the parse error.
    /// Sub-sitemaps that fail to load are logged and skipped.
    pub async fn extract_urls_from_xml(&self, content: &str) -> Resolution {
        self.extract_urls_at("sitemap document", content).await
    }

    /// Like [`Self::extract_urls_from_xml`], naming where the content came from
    pub async fn extract_urls_at(&self, origin: &str, content: &str) -> Resolution {
        self.extract_nested(origin, content, 0).await
    }

    fn extract_nested<'a>(
        &'a self,
        origin: &'a str,
        content: &'a str,
        nesting: u32,
    ) -> BoxFuture<'a, Resolution> {
        async move {
            let document = match parse_sitemap(origin, content) {
                Ok(document) => document,
                Err(e) => {
                    tracing::error!("XML parsing error: {}", e);
                    return Resolution::failed(e);
                }
            };

            match document {
                SitemapDocument::UrlSet(locs) => Resolution::from_set(normalize_locs(locs)),
                SitemapDocument::Index(children) => {
                    if nesting >= self.max_nesting {
                        tracing::warn!(
                            "Sitemap index {} nested too deeply ({} levels), skipping",
                            origin,
                            nesting
                        );
                        return Resolution::Empty(EmptyReason::NoUrls);
                    }

                    let children = normalize_locs(children);
                    tracing::info!(
                        "Found sitemap index with {} sub-sitemaps, processing...",
                        children.len()
                    );

                    let merged: CandidateSet = futures::stream::iter(children)
                        .map(|child| self.fetch_sub_sitemap(child, nesting + 1))
                        .buffer_unordered(self.concurrency)
                        .collect::<Vec<CandidateSet>>()
                        .await
                        .into_iter()
                        .flatten()
                        .collect();

                    Resolution::from_set(merged)
                }
            }
        }
        .boxed()
    }

    /// Fetches and extracts one child of a sitemap index; failures are swallowed
    async fn fetch_sub_sitemap(&self, url: String, nesting: u32) -> CandidateSet {
        match self.http.get(&url).await {
            Ok(response) if response.is_ok() => {
                match self.extract_nested(&url, &response.body, nesting).await {
                    Resolution::Found(urls) => urls,
                    Resolution::Empty(reason) => {
                        tracing::warn!("Sub-sitemap {} yielded nothing: {}", url, reason);
                        CandidateSet::new()
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(
                    "Failed to process sub-sitemap {}: HTTP {}",
                    url,
                    response.status_code
                );
                CandidateSet::new()
            }
            Err(e) => {
                tracing::warn!("Failed to process sub-sitemap {}: {}", url, e);
                CandidateSet::new()
            }
        }
    }
}
