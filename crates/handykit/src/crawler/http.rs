//! HTTP crawler
//!
//! Fetches pages with reqwest. HTML bodies come back as raw HTML, any
//! other textual body as extracted text. Binary content and non-success
//! statuses are reported as failed results.

use crate::config::ToolkitConfig;
use crate::crawler::{CrawlSession, Crawler, FetchResult};
use crate::error::ToolError;
use crate::text::is_html;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
    "font/",
];

const BINARY_MESSAGE: &str = "Binary content is not supported. \
    Only textual content (HTML, text, JSON, etc.) can be crawled.";

const INVALID_SCHEME_MESSAGE: &str = "Invalid URL: must start with http:// or https://";

/// Crawler backed by a reqwest client per session
#[derive(Debug, Clone)]
pub struct HttpCrawler {
    user_agent: String,
    connect_timeout: Duration,
    body_timeout: Duration,
}

impl HttpCrawler {
    /// Create a crawler with default settings
    pub fn new() -> Self {
        Self::from_config(&ToolkitConfig::default())
    }

    /// Create a crawler using the agent and timeouts of `config`
    pub fn from_config(config: &ToolkitConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            connect_timeout: config.connect_timeout,
            body_timeout: config.body_timeout,
        }
    }
}

impl Default for HttpCrawler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Crawler for HttpCrawler {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn open_session(&self) -> Result<Box<dyn CrawlSession>, ToolError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html, text/plain, */*;q=0.8"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| ToolError::InternalFailure(format!("Failed to create HTTP client: {e}")))?;

        debug!(crawler = self.name(), "Opened crawl session");
        Ok(Box::new(HttpCrawlSession {
            client,
            body_timeout: self.body_timeout,
        }))
    }
}

/// One reqwest client, dropped with the session
struct HttpCrawlSession {
    client: reqwest::Client,
    body_timeout: Duration,
}

#[async_trait]
impl CrawlSession for HttpCrawlSession {
    async fn crawl(&mut self, url: &str) -> Result<Vec<FetchResult>, ToolError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Ok(vec![FetchResult::failed(INVALID_SCHEME_MESSAGE)]);
        }
        if let Err(e) = Url::parse(url) {
            return Ok(vec![FetchResult::failed(format!("Invalid URL: {e}"))]);
        }

        let response = tokio::time::timeout(self.body_timeout, self.client.get(url).send())
            .await
            .map_err(|_| {
                ToolError::TransportFailure(format!(
                    "Request timed out: no response within {} seconds",
                    self.body_timeout.as_secs()
                ))
            })?
            .map_err(ToolError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Crawl got non-success status");
            return Ok(vec![FetchResult::failed(format!("HTTP {status}"))]);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ref ct) = content_type {
            if is_binary_content_type(ct) {
                return Ok(vec![FetchResult::failed(BINARY_MESSAGE)]);
            }
        }

        let (body, truncated) = read_body_with_timeout(response, self.body_timeout).await?;
        if truncated {
            warn!(url, bytes = body.len(), "Body read cut short, using partial content");
        }

        let content = String::from_utf8_lossy(&body).into_owned();
        let result = if is_html(content_type.as_deref(), &content) {
            FetchResult::html(content)
        } else {
            FetchResult::text(content)
        };

        Ok(vec![result])
    }
}

impl Drop for HttpCrawlSession {
    fn drop(&mut self) {
        debug!("Closed crawl session");
    }
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

/// Read response body with timeout, returning partial content if timeout occurs
///
/// A read error or deadline before any bytes arrive is a transport failure.
async fn read_body_with_timeout(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<(Bytes, bool), ToolError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let chunk_future = stream.next();
        let timeout_future = tokio::time::sleep_until(deadline);

        tokio::select! {
            chunk = chunk_future => {
                match chunk {
                    Some(Ok(bytes)) => {
                        body.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        error!("Error reading body chunk: {}", e);
                        if body.is_empty() {
                            return Err(ToolError::TransportFailure(format!(
                                "Error reading response body: {e}"
                            )));
                        }
                        return Ok((Bytes::from(body), true));
                    }
                    None => {
                        return Ok((Bytes::from(body), false));
                    }
                }
            }
            _ = timeout_future => {
                if body.is_empty() {
                    return Err(ToolError::TransportFailure(format!(
                        "Request timed out: no body within {} seconds",
                        timeout.as_secs()
                    )));
                }
                return Ok((Bytes::from(body), true));
            }
        }
    }
}
