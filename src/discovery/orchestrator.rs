//! Discovery orchestrator - the sitemap, robots, hyperlink fallback chain

use crate::config::Config;
use crate::discovery::http::{HttpClient, HttpGet};
use crate::discovery::links::HyperlinkScraper;
use crate::discovery::robots::RobotsResolver;
use crate::discovery::sitemap::SitemapResolver;
use crate::discovery::Resolution;
use crate::url::UrlFilter;
use crate::HarvestError;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Which strategy produced a discovery result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySource {
    Sitemap,
    Robots,
    Hyperlinks,
    /// Every strategy came back empty
    None,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sitemap => "sitemap",
            Self::Robots => "robots.txt",
            Self::Hyperlinks => "hyperlinks",
            Self::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// URLs discovered for a site, with the strategy that found them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub source: DiscoverySource,
    /// Sorted, unique URLs
    pub urls: Vec<String>,
}

impl Discovery {
    fn new(source: DiscoverySource, resolution: Resolution) -> Self {
        let mut urls: Vec<String> = resolution.into_urls().into_iter().collect();
        urls.sort();
        Self { source, urls }
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Runs the discovery strategies for a site
///
/// Strategies are tried in order: default sitemap locations, the sitemap
/// declared in robots.txt, then hyperlink scraping of the seed page. The
/// first non-empty result wins. Sitemap and robots output is returned as
/// is; scraped links are additionally passed through the URL classifier.
#[derive(Clone)]
pub struct Discoverer {
    sitemaps: SitemapResolver,
    robots: RobotsResolver,
    scraper: HyperlinkScraper,
    filter: UrlFilter,
}

impl Discoverer {
    /// Creates a discoverer with a real HTTP client built from `config`
    ///
    /// # Returns
    ///
    /// * `Ok(Discoverer)` - Ready to discover
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let http = HttpClient::from_config(&config.user_agent, &config.discovery)?;
        Ok(Self::with_http(Arc::new(http), config))
    }

    /// Creates a discoverer over any HTTP GET capability
    pub fn with_http(http: Arc<dyn HttpGet>, config: &Config) -> Self {
        let sitemaps = SitemapResolver::new(http.clone(), &config.discovery);
        let robots = RobotsResolver::new(http.clone(), sitemaps.clone());
        let scraper = HyperlinkScraper::new(http, &config.discovery, &config.filters);

        Self {
            sitemaps,
            robots,
            scraper,
            filter: UrlFilter::new(config.filters.clone()),
        }
    }

    /// Discovers the URLs of a site and reports which strategy found them
    ///
    /// Never fails: when every strategy comes back empty the result has
    /// source [`DiscoverySource::None`] and no URLs, and the caller decides
    /// whether that matters.
    pub async fn discover(&self, base_url: &str) -> Discovery {
        tracing::info!("Discovering URLs for {}", base_url);

        let resolution = self.sitemaps.try_default_sitemaps(base_url).await;
        if resolution.is_found() {
            return self.found(DiscoverySource::Sitemap, resolution);
        }
        log_empty(DiscoverySource::Sitemap, &resolution);

        let resolution = self.robots.try_robots_txt(base_url).await;
        if resolution.is_found() {
            return self.found(DiscoverySource::Robots, resolution);
        }
        log_empty(DiscoverySource::Robots, &resolution);

        let resolution = self.scraper.extract_hrefs(base_url, 0).await;
        if resolution.is_found() {
            let scraped = resolution.into_urls();
            let scraped_count = scraped.len();
            let kept: Vec<String> = scraped
                .into_iter()
                .filter(|url| self.filter.is_content_url(url))
                .collect();
            tracing::info!(
                "Classifier kept {} of {} scraped URLs",
                kept.len(),
                scraped_count
            );
            return self.found(
                DiscoverySource::Hyperlinks,
                Resolution::from_set(kept.into_iter().collect()),
            );
        }
        log_empty(DiscoverySource::Hyperlinks, &resolution);

        tracing::warn!("No URLs discovered for {}", base_url);
        Discovery::new(DiscoverySource::None, resolution)
    }

    /// Discovers the URLs of a site
    pub async fn get_all_urls(&self, base_url: &str) -> Vec<String> {
        self.discover(base_url).await.urls
    }

    fn found(&self, source: DiscoverySource, resolution: Resolution) -> Discovery {
        let discovery = Discovery::new(source, resolution);
        tracing::info!(
            "Discovered {} URLs via {}",
            discovery.urls.len(),
            discovery.source
        );
        discovery
    }
}

fn log_empty(source: DiscoverySource, resolution: &Resolution) {
    if let Some(reason) = resolution.reason() {
        tracing::info!("{} discovery yielded nothing: {}", source, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::testing::StubHttp;

    fn discoverer(http: StubHttp) -> (Discoverer, Arc<StubHttp>) {
        let http = Arc::new(http);
        (Discoverer::with_http(http.clone(), &Config::default()), http)
    }

    #[tokio::test]
    async fn test_sitemap_output_is_not_classified() {
        let (discoverer, http) = discoverer(StubHttp::new().with(
            "https://example.edu/sitemap.xml",
            200,
            "<urlset><url><loc>https://example.edu/academics/</loc></url>\
             <url><loc>https://example.edu/login</loc></url></urlset>",
        ));

        let discovery = discoverer.discover("https://example.edu").await;
        assert_eq!(discovery.source, DiscoverySource::Sitemap);
        assert_eq!(
            discovery.urls,
            vec!["https://example.edu/academics/", "https://example.edu/login"]
        );
        assert_eq!(http.calls(), vec!["https://example.edu/sitemap.xml"]);
    }

    #[tokio::test]
    async fn test_robots_used_when_no_default_sitemap() {
        let (discoverer, _) = discoverer(
            StubHttp::new()
                .with(
                    "https://example.com/robots.txt",
                    200,
                    "Sitemap: https://example.com/maps/all.xml",
                )
                .with(
                    "https://example.com/maps/all.xml",
                    200,
                    "<urlset><url><loc>https://example.com/page/2</loc></url></urlset>",
                ),
        );

        let discovery = discoverer.discover("https://example.com").await;
        assert_eq!(discovery.source, DiscoverySource::Robots);
        // Pagination would be rejected by the classifier, but robots output is trusted
        assert_eq!(discovery.urls, vec!["https://example.com/page/2"]);
    }

    #[tokio::test]
    async fn test_malformed_sitemap_falls_back() {
        let (discoverer, _) = discoverer(
            StubHttp::new()
                .with("https://example.com/sitemap.xml", 200, "<urlset><url>")
                .with(
                    "https://example.com/robots.txt",
                    200,
                    "Sitemap: https://example.com/other.xml",
                )
                .with(
                    "https://example.com/other.xml",
                    200,
                    "<urlset><url><loc>https://example.com/about/</loc></url></urlset>",
                ),
        );

        let discovery = discoverer.discover("https://example.com").await;
        assert_eq!(discovery.source, DiscoverySource::Robots);
        assert_eq!(discovery.urls, vec!["https://example.com/about/"]);
    }

    #[tokio::test]
    async fn test_scraped_links_are_classified() {
        let (discoverer, _) = discoverer(StubHttp::new().with_html(
            "https://example.com",
            r#"<a href="/research/lab">Lab</a>
               <a href="/login">Login</a>
               <a href="/assets/logo.png">Logo</a>
               <a href="/2023">Archive</a>"#,
        ));

        let discovery = discoverer.discover("https://example.com").await;
        assert_eq!(discovery.source, DiscoverySource::Hyperlinks);
        assert_eq!(discovery.urls, vec!["https://example.com/research/lab"]);
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let (discoverer, http) = discoverer(StubHttp::new());

        let discovery = discoverer.discover("https://example.com").await;
        assert_eq!(discovery.source, DiscoverySource::None);
        assert!(discovery.is_empty());
        // Three sitemap locations, robots.txt, then the seed page
        assert_eq!(http.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_get_all_urls_returns_list() {
        let (discoverer, _) = discoverer(StubHttp::new().with(
            "https://example.com/sitemap.xml",
            200,
            "<urlset><url><loc>https://example.com/b</loc></url>\
             <url><loc>https://example.com/a</loc></url></urlset>",
        ));
        assert_eq!(
            discoverer.get_all_urls("https://example.com").await,
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }
}
