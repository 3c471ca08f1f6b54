//! HTTP GET capability used by every resolver
//!
//! This module handles the raw HTTP side of discovery:
//! - Building the shared client with a proper user agent string
//! - Per-request timeouts
//! - Classifying transport failures into [`DiscoveryError::Network`]

use crate::config::{DiscoveryConfig, UserAgentConfig};
use crate::DiscoveryError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;

/// Media type families that never carry HTML
const BINARY_TYPE_PREFIXES: &[&str] = &["image/", "audio/", "video/", "font/"];

/// Individual binary media types
const BINARY_TYPES: &[&str] = &[
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/msword",
    "application/vnd.ms-excel",
    "application/vnd.ms-powerpoint",
];

/// Status and body of a completed GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    /// Content-Type header value, if sent
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    /// True for exactly HTTP 200
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// True when the content type names a binary format that cannot hold markup
    ///
    /// Anything else, including a missing, `text/plain` or generic
    /// `application/octet-stream` type, is treated as possibly HTML.
    pub fn is_binary(&self) -> bool {
        let Some(content_type) = self.content_type.as_deref() else {
            return false;
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        BINARY_TYPE_PREFIXES
            .iter()
            .any(|prefix| mime.starts_with(prefix))
            || BINARY_TYPES.contains(&mime.as_str())
    }
}

/// Fetches a URL, returning any HTTP status as a response
///
/// Implementations fail only on transport problems (unreachable host,
/// timeout); non-200 statuses come back as `Ok`.
#[async_trait]
pub trait HttpGet: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, DiscoveryError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Identification sent with every request
/// * `discovery` - Timeout settings
///
/// # Example
///
/// ```no_run
/// use site_harvest::config::{DiscoveryConfig, UserAgentConfig};
/// use site_harvest::discovery::build_http_client;
///
/// let client =
///     build_http_client(&UserAgentConfig::default(), &DiscoveryConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    discovery: &DiscoveryConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(discovery.request_timeout_secs))
        .connect_timeout(Duration::from_secs(discovery.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`HttpGet`] over a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Builds the client from user-agent and discovery settings
    pub fn from_config(
        user_agent: &UserAgentConfig,
        discovery: &DiscoveryConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, discovery)?;
        Ok(Self::new(
            client,
            Duration::from_secs(discovery.request_timeout_secs),
        ))
    }

    /// The underlying client, for sharing its connection pool
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpGet for HttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, DiscoveryError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| network_error(url, e))?;

        Ok(HttpResponse {
            status_code,
            content_type,
            body,
        })
    }
}

/// Classifies a transport failure
fn network_error(url: &str, error: reqwest::Error) -> DiscoveryError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    DiscoveryError::Network {
        url: url.to_string(),
        message,
    }
}
