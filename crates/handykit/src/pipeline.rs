//! Web content retrieval pipeline
//!
//! crawl → pick extracted text or raw HTML → strip markup → sanitize →
//! truncate → (optionally) summarize → sanitize → truncate.
//!
//! Every public entry point returns a string. Errors from the crawler,
//! the summarizer or any stage are rendered as
//! `[<operation> error] <Kind>: <message>` at this boundary.

use crate::config::ToolkitConfig;
use crate::crawler::{Crawler, FetchResult};
use crate::error::ToolError;
use crate::summarize::{summary_prompt, Summarizer};
use crate::text::{sanitize, strip_markup, truncate};
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, warn};

pub const NO_RESULT_MESSAGE: &str = "No result returned";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
pub const NO_CONTENT_MESSAGE: &str = "Crawl succeeded but no content was returned.";
pub const EMPTY_CONTENT_MESSAGE: &str = "Crawl succeeded but content was empty after cleaning.";
pub const NO_HTML_MESSAGE: &str = "Crawl succeeded but no HTML returned.";
pub const NO_SUMMARY_MESSAGE: &str = "Failed to generate summary.";

/// Operation names used in rendered errors
pub const CRAWL_OPERATION: &str = "crawl_web";
pub const CRAWL_RAW_OPERATION: &str = "crawl_web_raw";
pub const CRAWL_SUMMARIZE_OPERATION: &str = "crawl_web_summarized";

/// Crawl-and-clean pipeline
///
/// Holds no per-request state; concurrent calls each open their own
/// crawl session.
#[derive(Clone)]
pub struct RetrievalPipeline {
    crawler: Arc<dyn Crawler>,
    max_result_bytes: usize,
    summary_input_bytes: usize,
}

impl RetrievalPipeline {
    /// Create a pipeline over `crawler` using the ceilings in `config`
    pub fn new(crawler: Arc<dyn Crawler>, config: &ToolkitConfig) -> Self {
        Self {
            crawler,
            max_result_bytes: config.max_result_bytes,
            summary_input_bytes: config.summary_input_bytes,
        }
    }

    /// Crawl `url` and return its cleaned, truncated text
    pub async fn retrieve_and_clean(&self, url: &str) -> String {
        match self.cleaned_content(url).await {
            Ok(ControlFlow::Continue(text)) => truncate(&text, self.max_result_bytes),
            Ok(ControlFlow::Break(message)) => message,
            Err(e) => {
                warn!(url, error = %e, "Crawl pipeline failed");
                e.render(CRAWL_OPERATION)
            }
        }
    }

    /// Crawl `url`, clean it and return a summary of it
    pub async fn retrieve_clean_and_summarize(
        &self,
        url: &str,
        summarizer: &dyn Summarizer,
    ) -> String {
        match self.summarized_content(url, summarizer).await {
            Ok(output) => output,
            Err(e) => {
                warn!(url, error = %e, "Summarize pipeline failed");
                e.render(CRAWL_SUMMARIZE_OPERATION)
            }
        }
    }

    /// Crawl `url` and return its raw HTML, sanitized and truncated
    pub async fn retrieve_raw(&self, url: &str) -> String {
        let result = match self.first_result(url).await {
            Ok(ControlFlow::Continue(result)) => result,
            Ok(ControlFlow::Break(message)) => return message,
            Err(e) => {
                warn!(url, error = %e, "Raw crawl failed");
                return e.render(CRAWL_RAW_OPERATION);
            }
        };

        let html = result
            .raw_html
            .unwrap_or_else(|| NO_HTML_MESSAGE.to_string());
        truncate(&sanitize(&html), self.max_result_bytes)
    }

    async fn summarized_content(
        &self,
        url: &str,
        summarizer: &dyn Summarizer,
    ) -> Result<String, ToolError> {
        let text = match self.cleaned_content(url).await? {
            ControlFlow::Continue(text) => text,
            ControlFlow::Break(message) => return Ok(message),
        };

        let prompt = summary_prompt(&truncate(&text, self.summary_input_bytes));
        let summary = match summarizer.summarize(&prompt).await? {
            Some(summary) if !summary.trim().is_empty() => summary,
            _ => {
                debug!(url, "Summarizer returned no text");
                return Ok(NO_SUMMARY_MESSAGE.to_string());
            }
        };

        Ok(truncate(sanitize(&summary).trim(), self.max_result_bytes))
    }

    /// Crawl and clean; `Break` carries a final user-facing message
    async fn cleaned_content(&self, url: &str) -> Result<ControlFlow<String, String>, ToolError> {
        let result = match self.first_result(url).await? {
            ControlFlow::Continue(result) => result,
            ControlFlow::Break(message) => return Ok(ControlFlow::Break(message)),
        };

        let content = match select_content(result) {
            Some(content) => content,
            None => return Ok(ControlFlow::Break(NO_CONTENT_MESSAGE.to_string())),
        };

        let cleaned = sanitize(&strip_markup(&content)).trim().to_string();
        if cleaned.is_empty() {
            return Ok(ControlFlow::Break(EMPTY_CONTENT_MESSAGE.to_string()));
        }

        debug!(url, bytes = cleaned.len(), "Cleaned page content");
        Ok(ControlFlow::Continue(cleaned))
    }

    /// Run one crawl inside its own session and keep the first record
    async fn first_result(&self, url: &str) -> Result<ControlFlow<String, FetchResult>, ToolError> {
        debug!(crawler = self.crawler.name(), url, "Crawling page");

        let results = {
            let mut session = self.crawler.open_session().await?;
            session.crawl(url).await?
        };

        let Some(result) = results.into_iter().next() else {
            return Ok(ControlFlow::Break(crawl_failed(NO_RESULT_MESSAGE)));
        };

        if !result.success {
            let message = result
                .error_message
                .as_deref()
                .unwrap_or(UNKNOWN_ERROR_MESSAGE);
            return Ok(ControlFlow::Break(crawl_failed(message)));
        }

        Ok(ControlFlow::Continue(result))
    }
}

fn crawl_failed(message: &str) -> String {
    format!("Crawl failed: {}", sanitize(message))
}

/// Prefer non-empty extracted text, fall back to raw HTML
fn select_content(result: FetchResult) -> Option<String> {
    match result.extracted_text {
        Some(text) if !text.is_empty() => Some(text),
        _ => result.raw_html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::CrawlSession;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Crawler that replays a canned outcome and counts open sessions
    struct StubCrawler {
        outcome: Mutex<Option<Result<Vec<FetchResult>, ToolError>>>,
        open_sessions: Arc<AtomicUsize>,
    }

    impl StubCrawler {
        fn new(outcome: Result<Vec<FetchResult>, ToolError>) -> Self {
            Self {
                outcome: Mutex::new(Some(outcome)),
                open_sessions: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct StubSession {
        outcome: Option<Result<Vec<FetchResult>, ToolError>>,
        open_sessions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Crawler for StubCrawler {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn open_session(&self) -> Result<Box<dyn CrawlSession>, ToolError> {
            self.open_sessions.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubSession {
                outcome: self.outcome.lock().unwrap().take(),
                open_sessions: self.open_sessions.clone(),
            }))
        }
    }

    #[async_trait]
    impl CrawlSession for StubSession {
        async fn crawl(&mut self, _url: &str) -> Result<Vec<FetchResult>, ToolError> {
            self.outcome.take().unwrap_or_else(|| Ok(vec![]))
        }
    }

    impl Drop for StubSession {
        fn drop(&mut self) {
            self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
    }

    struct FailingCrawler;

    #[async_trait]
    impl Crawler for FailingCrawler {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn open_session(&self) -> Result<Box<dyn CrawlSession>, ToolError> {
            Err(ToolError::InternalFailure("browser unavailable".into()))
        }
    }

    struct StubSummarizer {
        reply: Result<Option<String>, ToolError>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubSummarizer {
        fn new(reply: Result<Option<String>, ToolError>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Summarizer for StubSummarizer {
        async fn summarize(&self, prompt: &str) -> Result<Option<String>, ToolError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(ToolError::TransportFailure(e.to_string())),
            }
        }
    }

    fn pipeline_with(
        outcome: Result<Vec<FetchResult>, ToolError>,
    ) -> (RetrievalPipeline, Arc<AtomicUsize>) {
        let crawler = StubCrawler::new(outcome);
        let open = crawler.open_sessions.clone();
        let pipeline = RetrievalPipeline::new(Arc::new(crawler), &ToolkitConfig::default());
        (pipeline, open)
    }

    #[tokio::test]
    async fn test_crawl_failed_with_message() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::failed("timeout")]));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "Crawl failed: timeout"
        );
    }

    #[tokio::test]
    async fn test_crawl_failed_without_message() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult {
            success: false,
            ..Default::default()
        }]));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "Crawl failed: Unknown error"
        );
    }

    #[tokio::test]
    async fn test_crawl_failed_message_is_sanitized() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::failed(
            "d\u{e9}lai d\u{e9}pass\u{e9}",
        )]));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "Crawl failed: dlai dpass"
        );
    }

    #[tokio::test]
    async fn test_no_result_returned() {
        let (pipeline, _) = pipeline_with(Ok(vec![]));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "Crawl failed: No result returned"
        );
    }

    #[tokio::test]
    async fn test_no_content_returned() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult {
            success: true,
            extracted_text: Some(String::new()),
            raw_html: None,
            error_message: None,
        }]));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            NO_CONTENT_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_empty_after_cleaning() {
        let (pipeline, _) =
            pipeline_with(Ok(vec![FetchResult::html("<script>track();</script>")]));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            EMPTY_CONTENT_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_clean_html() {
        let html = concat!(
            "<html><head><style>p{}</style></head>",
            "<body><h1>Caf\u{e9} News</h1>\n<p>Hello&nbsp;World</p></body></html>",
        );
        let (pipeline, open) = pipeline_with(Ok(vec![FetchResult::html(html)]));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "Caf News Hello World"
        );
        assert_eq!(open.load(Ordering::SeqCst), 0, "session must be released");
    }

    #[tokio::test]
    async fn test_extracted_text_preferred_over_html() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult {
            success: true,
            extracted_text: Some("Extracted body".into()),
            raw_html: Some("<p>Raw body</p>".into()),
            error_message: None,
        }]));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "Extracted body"
        );
    }

    #[tokio::test]
    async fn test_output_truncated_to_ceiling() {
        let crawler = StubCrawler::new(Ok(vec![FetchResult::text("word ".repeat(100))]));
        let config = ToolkitConfig::default().with_max_result_bytes(12);
        let pipeline = RetrievalPipeline::new(Arc::new(crawler), &config);
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "word word wo\n...[truncated]"
        );
    }

    #[tokio::test]
    async fn test_crawl_error_rendered_and_session_released() {
        let (pipeline, open) = pipeline_with(Err(ToolError::TransportFailure(
            "connection refused".into(),
        )));
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "[crawl_web error] TransportFailure: connection refused"
        );
        assert_eq!(open.load(Ordering::SeqCst), 0, "session must be released");
    }

    #[tokio::test]
    async fn test_session_open_error_rendered() {
        let pipeline = RetrievalPipeline::new(Arc::new(FailingCrawler), &ToolkitConfig::default());
        assert_eq!(
            pipeline.retrieve_and_clean("https://example.com").await,
            "[crawl_web error] InternalFailure: browser unavailable"
        );
    }

    #[tokio::test]
    async fn test_summary_returned() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::html("<p>Long article</p>")]));
        let summarizer = StubSummarizer::new(Ok(Some("  Short summary \u{2014} done \n".into())));
        let output = pipeline
            .retrieve_clean_and_summarize("https://example.com", &summarizer)
            .await;
        assert_eq!(output, "Short summary  done");
        assert_eq!(
            summarizer.prompts.lock().unwrap().as_slice(),
            ["Summarize the following content:\n\nLong article"]
        );
    }

    #[tokio::test]
    async fn test_summary_prompt_content_truncated() {
        let crawler = StubCrawler::new(Ok(vec![FetchResult::text("x".repeat(5_000))]));
        let pipeline = RetrievalPipeline::new(Arc::new(crawler), &ToolkitConfig::default());
        let summarizer = StubSummarizer::new(Ok(Some("ok".into())));
        pipeline
            .retrieve_clean_and_summarize("https://example.com", &summarizer)
            .await;

        let prompts = summarizer.prompts.lock().unwrap();
        let expected = format!(
            "Summarize the following content:\n\n{}\n...[truncated]",
            "x".repeat(3_000)
        );
        assert_eq!(prompts[0], expected);
    }

    #[tokio::test]
    async fn test_summary_none() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::html("<p>Article</p>")]));
        let summarizer = StubSummarizer::new(Ok(None));
        assert_eq!(
            pipeline
                .retrieve_clean_and_summarize("https://example.com", &summarizer)
                .await,
            NO_SUMMARY_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_summary_skipped_when_crawl_fails() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::failed("HTTP 404 Not Found")]));
        let summarizer = StubSummarizer::new(Ok(Some("unused".into())));
        assert_eq!(
            pipeline
                .retrieve_clean_and_summarize("https://example.com", &summarizer)
                .await,
            "Crawl failed: HTTP 404 Not Found"
        );
        assert!(summarizer.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_error_rendered() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::html("<p>Article</p>")]));
        let summarizer =
            StubSummarizer::new(Err(ToolError::TransportFailure("model offline".into())));
        assert_eq!(
            pipeline
                .retrieve_clean_and_summarize("https://example.com", &summarizer)
                .await,
            "[crawl_web_summarized error] TransportFailure: model offline"
        );
    }

    #[tokio::test]
    async fn test_raw_variant_keeps_markup() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::html("<p>Caf\u{e9}</p>")]));
        assert_eq!(pipeline.retrieve_raw("https://example.com").await, "<p>Caf</p>");
    }

    #[tokio::test]
    async fn test_raw_variant_without_html() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::text("plain")]));
        assert_eq!(
            pipeline.retrieve_raw("https://example.com").await,
            NO_HTML_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_raw_variant_failure() {
        let (pipeline, _) = pipeline_with(Ok(vec![FetchResult::failed("timeout")]));
        assert_eq!(
            pipeline.retrieve_raw("https://example.com").await,
            "Crawl failed: timeout"
        );
    }
}
