//! Page retrieval for the retrieval pipeline
//!
//! Design: a [`Crawler`] hands out one [`CrawlSession`] per pipeline run.
//! The session owns whatever connection state the crawl needs and releases
//! it when dropped, so every exit path of the pipeline tears it down.

mod http;

pub use http::HttpCrawler;

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of crawling a single URL
///
/// Expected failures (bad scheme, non-success status, binary content) are
/// reported with `success == false` and an `error_message`, not as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Whether the page was retrieved
    pub success: bool,

    /// Already de-tagged text, when the crawler could provide it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,

    /// Raw HTML body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,

    /// Why the crawl failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl FetchResult {
    /// Successful result carrying raw HTML
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            success: true,
            raw_html: Some(html.into()),
            ..Default::default()
        }
    }

    /// Successful result carrying extracted text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            success: true,
            extracted_text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Failed result with a reason
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Source of crawl sessions
#[async_trait]
pub trait Crawler: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Open a session for one crawl
    async fn open_session(&self) -> Result<Box<dyn CrawlSession>, ToolError>;
}

/// A scoped crawling session
///
/// Dropping the session releases its resources.
#[async_trait]
pub trait CrawlSession: Send {
    /// Crawl `url`, returning one record per retrieved page
    ///
    /// Callers only look at the first record.
    async fn crawl(&mut self, url: &str) -> Result<Vec<FetchResult>, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_result_constructors() {
        let r = FetchResult::html("<p>x</p>");
        assert!(r.success);
        assert_eq!(r.raw_html.as_deref(), Some("<p>x</p>"));
        assert!(r.extracted_text.is_none());

        let r = FetchResult::text("plain");
        assert!(r.success);
        assert_eq!(r.extracted_text.as_deref(), Some("plain"));
        assert!(r.raw_html.is_none());

        let r = FetchResult::failed("timeout");
        assert!(!r.success);
        assert_eq!(r.error_message.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_fetch_result_serialization() {
        let json = serde_json::to_string(&FetchResult::failed("boom")).unwrap();
        assert_eq!(json, r#"{"success":false,"error_message":"boom"}"#);

        let parsed: FetchResult = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(
            parsed,
            FetchResult {
                success: true,
                ..Default::default()
            }
        );
    }
}
