//! Robots.txt sitemap discovery
//!
//! Only the sitemap pointer is read from robots.txt; allow/disallow rules and
//! crawl delays are not interpreted.

use crate::discovery::http::HttpGet;
use crate::discovery::sitemap::SitemapResolver;
use crate::discovery::{EmptyReason, Resolution};
use crate::url::normalize_candidate;
use crate::DiscoveryError;
use std::sync::Arc;
use url::Url;

/// Finds the sitemap URL declared in robots.txt content
///
/// The first line containing `sitemap:` (any case) is the only one honored;
/// the URL is the text between its first and second `": "` separators, so a
/// trailing `": "`-separated remark is cut off. A first match without that
/// separator yields `None` rather than falling through to later lines.
///
/// # Example
///
/// ```
/// use site_harvest::discovery::find_sitemap_directive;
///
/// let robots = "User-agent: *\nDisallow: /admin\nSitemap: https://example.com/sm.xml\n";
/// assert_eq!(
///     find_sitemap_directive(robots),
///     Some("https://example.com/sm.xml".to_string())
/// );
/// ```
pub fn find_sitemap_directive(robots_txt: &str) -> Option<String> {
    let line = robots_txt
        .lines()
        .find(|line| line.to_lowercase().contains("sitemap:"))?;

    line.split(": ")
        .nth(1)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolves candidate URLs through the sitemap declared in robots.txt
#[derive(Clone)]
pub struct RobotsResolver {
    http: Arc<dyn HttpGet>,
    sitemaps: SitemapResolver,
}

impl RobotsResolver {
    pub fn new(http: Arc<dyn HttpGet>, sitemaps: SitemapResolver) -> Self {
        Self { http, sitemaps }
    }

    /// Fetches `/robots.txt`, follows its sitemap pointer and extracts URLs
    ///
    /// Every failure along the way (network, status, parse) becomes an empty
    /// resolution carrying the error.
    pub async fn try_robots_txt(&self, base_url: &str) -> Resolution {
        tracing::info!("Attempting to find sitemap in robots.txt...");

        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                return Resolution::failed(DiscoveryError::Parse {
                    origin: base_url.to_string(),
                    message: e.to_string(),
                })
            }
        };

        let robots_url = match base.join("/robots.txt") {
            Ok(url) => url,
            Err(e) => {
                return Resolution::failed(DiscoveryError::Parse {
                    origin: base_url.to_string(),
                    message: e.to_string(),
                })
            }
        };

        let response = match self.http.get(robots_url.as_str()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch robots.txt: {}", e);
                return Resolution::failed(e);
            }
        };

        if !response.is_ok() {
            tracing::info!("No robots.txt at {} (HTTP {})", robots_url, response.status_code);
            return Resolution::Empty(EmptyReason::NotPresent);
        }

        let declared = match find_sitemap_directive(&response.body) {
            Some(declared) => declared,
            None => {
                tracing::info!("No valid sitemap found in robots.txt");
                return Resolution::Empty(EmptyReason::NotPresent);
            }
        };
        tracing::info!("Found sitemap URL in robots.txt: {}", declared);

        let sitemap_url = match normalize_candidate(&declared, Some(&base)) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Unusable sitemap URL in robots.txt {:?}: {}", declared, e);
                return Resolution::failed(DiscoveryError::Parse {
                    origin: robots_url.to_string(),
                    message: e.to_string(),
                });
            }
        };

        match self.http.get(&sitemap_url).await {
            Ok(response) if response.is_ok() => {
                self.sitemaps
                    .extract_urls_at(&sitemap_url, &response.body)
                    .await
            }
            Ok(response) => {
                tracing::warn!(
                    "Failed to fetch sitemap from robots.txt URL {}: HTTP {}",
                    sitemap_url,
                    response.status_code
                );
                Resolution::failed(DiscoveryError::NotFound {
                    url: sitemap_url,
                    status: response.status_code,
                })
            }
            Err(e) => {
                tracing::warn!("Failed to fetch sitemap from robots.txt URL: {}", e);
                Resolution::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;
    use crate::discovery::testing::StubHttp;
    use crate::discovery::CandidateSet;

    fn resolver(http: StubHttp) -> (RobotsResolver, Arc<StubHttp>) {
        let http = Arc::new(http);
        let sitemaps = SitemapResolver::new(http.clone(), &DiscoveryConfig::default());
        (RobotsResolver::new(http.clone(), sitemaps), http)
    }

    #[test]
    fn test_directive_case_insensitive() {
        assert_eq!(
            find_sitemap_directive("SITEMAP: https://example.com/a.xml"),
            Some("https://example.com/a.xml".to_string())
        );
        assert_eq!(
            find_sitemap_directive("sitemap: https://example.com/a.xml\r"),
            Some("https://example.com/a.xml".to_string())
        );
    }

    #[test]
    fn test_only_first_directive_honored() {
        let robots = "Sitemap: https://example.com/first.xml\nSitemap: https://example.com/second.xml";
        assert_eq!(
            find_sitemap_directive(robots),
            Some("https://example.com/first.xml".to_string())
        );

        // A first match without ": " does not fall through to the next line
        let robots = "Sitemap:https://example.com/first.xml\nSitemap: https://example.com/second.xml";
        assert_eq!(find_sitemap_directive(robots), None);
    }

    #[test]
    fn test_value_ends_at_next_separator() {
        assert_eq!(
            find_sitemap_directive("Sitemap: https://example.com/s.xml # note: y"),
            Some("https://example.com/s.xml # note".to_string())
        );
        assert_eq!(
            find_sitemap_directive("Sitemap: https://example.com/s.xml: extra"),
            Some("https://example.com/s.xml".to_string())
        );
    }

    #[test]
    fn test_no_directive() {
        assert_eq!(find_sitemap_directive("User-agent: *\nDisallow: /"), None);
        assert_eq!(find_sitemap_directive(""), None);
    }

    #[tokio::test]
    async fn test_follows_declared_sitemap() {
        let (resolver, http) = resolver(
            StubHttp::new()
                .with(
                    "https://example.com/robots.txt",
                    200,
                    "User-agent: *\nSitemap: https://example.com/custom-map.xml\n",
                )
                .with(
                    "https://example.com/custom-map.xml",
                    200,
                    "<urlset><url><loc>https://example.com/page</loc></url></urlset>",
                ),
        );

        let expected: CandidateSet = ["https://example.com/page".to_string()].into();
        assert_eq!(
            resolver.try_robots_txt("https://example.com").await,
            Resolution::Found(expected)
        );
        assert_eq!(
            http.calls(),
            vec![
                "https://example.com/robots.txt",
                "https://example.com/custom-map.xml"
            ]
        );
    }

    #[tokio::test]
    async fn test_relative_sitemap_pointer_resolved() {
        let (resolver, _) = resolver(
            StubHttp::new()
                .with("https://example.com/robots.txt", 200, "Sitemap: /maps/main.xml")
                .with(
                    "https://example.com/maps/main.xml",
                    200,
                    "<urlset><url><loc>https://example.com/x</loc></url></urlset>",
                ),
        );
        assert!(resolver.try_robots_txt("https://example.com").await.is_found());
    }

    #[tokio::test]
    async fn test_missing_robots_is_not_present() {
        let (resolver, http) = resolver(StubHttp::new());
        assert_eq!(
            resolver.try_robots_txt("https://example.com").await,
            Resolution::Empty(EmptyReason::NotPresent)
        );
        assert_eq!(http.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_robots_without_sitemap_line() {
        let (resolver, _) = resolver(StubHttp::new().with(
            "https://example.com/robots.txt",
            200,
            "User-agent: *\nDisallow: /private",
        ));
        assert_eq!(
            resolver.try_robots_txt("https://example.com").await,
            Resolution::Empty(EmptyReason::NotPresent)
        );
    }

    #[tokio::test]
    async fn test_declared_sitemap_missing() {
        let (resolver, _) = resolver(StubHttp::new().with(
            "https://example.com/robots.txt",
            200,
            "Sitemap: https://example.com/gone.xml",
        ));
        assert!(matches!(
            resolver.try_robots_txt("https://example.com").await,
            Resolution::Empty(EmptyReason::Failed(DiscoveryError::NotFound { status: 404, .. }))
        ));
    }

    #[tokio::test]
    async fn test_robots_network_failure() {
        let (resolver, _) = resolver(StubHttp::new().with_error("https://example.com/robots.txt"));
        assert!(matches!(
            resolver.try_robots_txt("https://example.com").await,
            Resolution::Empty(EmptyReason::Failed(DiscoveryError::Network { .. }))
        ));
    }
}
