//! Content-rich URL classification
//!
//! A URL is judged by a fixed sequence of list-driven rules; the first rule
//! that matches decides. The lists below are the defaults and can be replaced
//! through [`FilterConfig`].

use crate::config::FilterConfig;
use std::sync::OnceLock;
use url::Url;

/// Extensions of files that are never page content
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods", ".odp", ".rtf",
    ".csv",
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg", ".ico", ".tif", ".tiff",
    // Audio and video
    ".mp3", ".wav", ".ogg", ".flac", ".m4a", ".mp4", ".m4v", ".mov", ".avi", ".wmv", ".webm",
    ".mkv",
    // Archives
    ".zip", ".rar", ".7z", ".tar", ".gz", ".tgz", ".bz2",
    // Web assets
    ".css", ".js", ".mjs", ".map", ".woff", ".woff2", ".ttf", ".otf", ".eot",
    // Config and data files
    ".xml", ".json", ".yaml", ".yml", ".ini", ".cfg", ".conf", ".rss", ".atom", ".txt",
];

/// Query parameter prefixes used for tracking, sorting and pagination
pub const DEFAULT_EXCLUDED_PARAMS: &[&str] = &[
    "page=",
    "sort=",
    "filter=",
    "tag=",
    "category=",
    "lang=",
    "ref=",
    "source=",
    "utm_",
    "fbclid=",
    "gclid=",
    "mc_cid=",
    "mc_eid=",
    "sessionid=",
    "replytocom=",
    "share=",
    "print=",
];

/// Path substrings for admin/CMS, asset, auth, shop and tracking endpoints
pub const DEFAULT_EXCLUDED_PATHS: &[&str] = &[
    // Taxonomy and listing pages
    "/tag/", "/category/", "/author/", "/search/", "/page/", "/archive/", "/month/", "/date/",
    "/feed/", "/rss/", "/sitemap/", "/comment/",
    // CMS and admin
    "/wp-admin/", "/wp-includes/", "/wp-content/", "/wp-json/", "/xmlrpc", "/admin/",
    "/cgi-bin/",
    // Asset directories
    "/assets/", "/images/", "/css/", "/js/", "/static/", "/uploads/", "/fonts/", "/cdn-cgi/",
    "/api/",
    // Auth and session
    "/login/", "/logout/", "/signin/", "/register/", "/signup/", "/account/", "/auth/",
    "/oauth/", "/session/", "/user/",
    // E-commerce flows
    "/cart/", "/checkout/", "/shop/", "/product/", "/basket/", "/wishlist/", "/order/",
    // Analytics and tracking
    "/analytics/", "/tracking/", "/track/", "/pixel/", "/share/", "/print/",
];

/// Path substrings typical of content and organisation pages
pub const DEFAULT_CONTENT_INDICATORS: &[&str] = &[
    "/article/",
    "/articles/",
    "/post/",
    "/posts/",
    "/blog/",
    "/guide/",
    "/guides/",
    "/tutorial/",
    "/docs/",
    "/about/",
    "/content/",
    "/courses/",
    "/faculty/",
    "/department/",
    "/departments/",
    "/research/",
    "/publication/",
    "/publications/",
    "/news/",
    "/events/",
    "/admission/",
    "/admissions/",
    "/academics/",
    "/programs/",
    "/people/",
    "/staff/",
    "/services/",
    "/projects/",
];

/// Why a URL was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The string is not an absolute URL
    Unparseable,
    /// Path ends with a non-content file extension
    Extension,
    /// Carries a tracking/navigation parameter
    TrackingParam,
    /// Contains an excluded path substring
    ExcludedPath,
    /// Path is a bare number
    Pagination,
    /// More path segments than allowed
    TooDeep,
    /// Deeper than two segments without a content indicator
    NoIndicator,
}

/// Outcome of classifying one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Matched a content indicator
    ContentIndicator,
    /// Shallow path, likely a top-level section
    ShallowPath,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Heuristic content filter over a set of exclusion/indicator lists
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    config: FilterConfig,
}

impl UrlFilter {
    /// Builds a filter from configured lists
    ///
    /// Entries are lowercased once here so matching can work on lowercase
    /// URLs only.
    pub fn new(mut config: FilterConfig) -> Self {
        for list in [
            &mut config.excluded_extensions,
            &mut config.excluded_params,
            &mut config.excluded_paths,
            &mut config.content_indicators,
        ] {
            for entry in list.iter_mut() {
                *entry = entry.to_lowercase();
            }
        }
        Self { config }
    }

    /// The lists this filter applies
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Returns true if the URL is likely to hold substantive content
    ///
    /// Never fails: a URL that does not parse is simply not content.
    pub fn is_content_url(&self, url: &str) -> bool {
        self.classify(url).is_accepted()
    }

    /// Runs the classification rules in order; the first match wins
    pub fn classify(&self, url: &str) -> Verdict {
        let parsed = match Url::parse(url.trim()) {
            Ok(parsed) => parsed,
            Err(_) => return Verdict::Rejected(Rejection::Unparseable),
        };

        let url_lower = url.trim().to_lowercase();
        let path = parsed.path().to_lowercase();

        if self
            .config
            .excluded_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
        {
            return Verdict::Rejected(Rejection::Extension);
        }

        // Checked against the whole URL, which covers the query string
        if self
            .config
            .excluded_params
            .iter()
            .any(|param| url_lower.contains(param.as_str()))
        {
            return Verdict::Rejected(Rejection::TrackingParam);
        }

        if self
            .config
            .excluded_paths
            .iter()
            .any(|excluded| url_lower.contains(excluded.as_str()))
        {
            return Verdict::Rejected(Rejection::ExcludedPath);
        }

        let trimmed = path.trim_matches('/');
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Verdict::Rejected(Rejection::Pagination);
        }

        let segments = path.split('/').filter(|s| !s.is_empty()).count();
        if segments > self.config.max_path_segments {
            return Verdict::Rejected(Rejection::TooDeep);
        }

        if self
            .config
            .content_indicators
            .iter()
            .any(|indicator| url_lower.contains(indicator.as_str()))
        {
            return Verdict::ContentIndicator;
        }

        if segments <= 2 {
            Verdict::ShallowPath
        } else {
            Verdict::Rejected(Rejection::NoIndicator)
        }
    }
}

/// Classifies a URL with the default lists
///
/// ```
/// use site_harvest::url::is_content_url;
///
/// assert!(is_content_url("https://example.edu/research/robotics-lab"));
/// assert!(!is_content_url("https://example.edu/research/report.pdf"));
/// assert!(!is_content_url("https://example.edu/123"));
/// ```
pub fn is_content_url(url: &str) -> bool {
    static DEFAULT_FILTER: OnceLock<UrlFilter> = OnceLock::new();
    DEFAULT_FILTER
        .get_or_init(UrlFilter::default)
        .is_content_url(url)
}
