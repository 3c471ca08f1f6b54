use crate::UrlError;
use url::Url;

/// Pseudo-link prefixes that never lead to a page
const NON_NAVIGABLE_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes a discovered link into a candidate URL string
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace (sitemap `<loc>` values are often padded)
/// 2. Reject empty, fragment-only and `javascript:`/`mailto:`/`tel:`/`data:` links
/// 3. Resolve relative references against `base` when one is given
/// 4. Require an `http` or `https` scheme and a host
/// 5. Serialize through the `url` crate, so equal URLs compare equal as strings
///    (lowercased host, `/` path for bare origins)
///
/// # Examples
///
/// ```
/// use site_harvest::url::normalize_candidate;
/// use url::Url;
///
/// let base = Url::parse("https://Example.com/docs/").unwrap();
/// assert_eq!(
///     normalize_candidate(" intro ", Some(&base)).unwrap(),
///     "https://example.com/docs/intro"
/// );
/// assert!(normalize_candidate("mailto:hi@example.com", Some(&base)).is_err());
/// ```
pub fn normalize_candidate(raw: &str, base: Option<&Url>) -> Result<String, UrlError> {
    let raw = raw.trim();

    if raw.is_empty() || raw.starts_with('#') {
        return Err(UrlError::NotNavigable(raw.to_string()));
    }

    let lower = raw.to_lowercase();
    if NON_NAVIGABLE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return Err(UrlError::NotNavigable(raw.to_string()));
    }

    let url = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    }
    .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url.to_string())
}
