use url::Url;

/// Returns the site identity of a parsed URL
///
/// The host is lowercased and a single leading `www.` label is stripped. An
/// explicit non-default port stays attached (`example.com:8080`), so two
/// services on one host are different sites.
pub fn site_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let host = match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    };

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Extracts the comparable domain from a URL string
///
/// Returns `None` when the string does not parse or has no host.
///
/// # Examples
///
/// ```
/// use site_harvest::url::get_domain;
///
/// assert_eq!(get_domain("https://WWW.Example.com/a"), Some("example.com".to_string()));
/// assert_eq!(get_domain("https://blog.example.com/"), Some("blog.example.com".to_string()));
/// assert_eq!(get_domain("not a url"), None);
/// ```
pub fn get_domain(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => site_domain(&parsed),
        Err(e) => {
            tracing::debug!("Domain extraction failed for {}: {}", url, e);
            None
        }
    }
}

/// True iff both URLs resolve to the same, non-null domain
///
/// ```
/// use site_harvest::url::is_same_domain;
///
/// assert!(is_same_domain("https://www.example.com/a", "https://example.com/b"));
/// assert!(!is_same_domain("https://example.com/", "https://example.org/"));
/// ```
pub fn is_same_domain(base_url: &str, candidate_url: &str) -> bool {
    match (get_domain(base_url), get_domain(candidate_url)) {
        (Some(base), Some(candidate)) => base == candidate,
        _ => false,
    }
}

/// Checks a host against an exclusion pattern
///
/// `example.com` matches that host (with or without `www.`); `*.example.com`
/// also matches every subdomain.
pub fn host_matches_pattern(pattern: &str, host: &str) -> bool {
    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern.trim_start_matches("www."),
    }
}
