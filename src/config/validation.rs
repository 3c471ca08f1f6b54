use crate::config::types::{
    Config, DiscoveryConfig, FetchConfig, FilterConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_discovery_config(&config.discovery)?;
    validate_filter_config(&config.filters)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates discovery configuration
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.sitemap_concurrency < 1 || config.sitemap_concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "sitemap_concurrency must be between 1 and 64, got {}",
            config.sitemap_concurrency
        )));
    }

    if config.sitemap_locations.is_empty() {
        return Err(ConfigError::Validation(
            "sitemap_locations cannot be empty".to_string(),
        ));
    }

    for location in &config.sitemap_locations {
        if !location.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "sitemap location '{}' must start with '/'",
                location
            )));
        }
    }

    Ok(())
}

/// Validates classifier and scraper lists
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.max_path_segments < 1 {
        return Err(ConfigError::Validation(
            "max_path_segments must be >= 1".to_string(),
        ));
    }

    for ext in &config.excluded_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "excluded extension '{}' must look like '.ext'",
                ext
            )));
        }
    }

    let lists = [
        ("excluded_params", &config.excluded_params),
        ("excluded_paths", &config.excluded_paths),
        ("content_indicators", &config.content_indicators),
        ("ignored_link_patterns", &config.ignored_link_patterns),
        ("navigation_classes", &config.navigation_classes),
    ];
    for (name, list) in lists {
        if list.iter().any(|entry| entry.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot contain empty entries",
                name
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates the page fetcher run configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if let Some(selector) = &config.css_selector {
        Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("Invalid css_selector '{}': {:?}", selector, e))
        })?;
    }

    for tag in &config.excluded_tags {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ConfigError::Validation(format!(
                "excluded tag '{}' is not a tag name",
                tag
            )));
        }
    }

    for pattern in &config.exclude_domains {
        validate_domain_pattern(pattern)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation("output path cannot be empty".to_string()));
    }

    if let Some(session_id) = &config.session_id {
        if session_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "session_id cannot be blank".to_string(),
            ));
        }
    }

    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
