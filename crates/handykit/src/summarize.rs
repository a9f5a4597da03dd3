//! Text summarization
//!
//! The pipeline only needs "prompt in, optional text out". The bundled
//! [`ChatCompletionsSummarizer`] talks to any OpenAI-compatible
//! `/v1/chat/completions` endpoint.

use crate::config::ToolkitConfig;
use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Instruction placed ahead of the page content
pub const SUMMARY_INSTRUCTION: &str = "Summarize the following content:";

/// Build the prompt sent to a summarizer
pub fn summary_prompt(content: &str) -> String {
    format!("{SUMMARY_INSTRUCTION}\n\n{content}")
}

/// A capability that can summarize text
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `prompt`
    ///
    /// `Ok(None)` means the backend produced no text, which is a valid
    /// outcome rather than an error.
    async fn summarize(&self, prompt: &str) -> Result<Option<String>, ToolError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat completions API
#[derive(Debug, Clone)]
pub struct ChatCompletionsSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsSummarizer {
    /// Create a summarizer for `base_url` (e.g. `http://localhost:11434`)
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, ToolError> {
        Self::from_config(&ToolkitConfig::default(), base_url, model)
    }

    /// Create a summarizer using the agent and timeouts of `config`
    pub fn from_config(
        config: &ToolkitConfig,
        base_url: &str,
        model: impl Into<String>,
    ) -> Result<Self, ToolError> {
        let client = config.http_client().map_err(|e| {
            ToolError::InternalFailure(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key: None,
        })
    }

    /// Send a bearer token with each request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Summarizer for ChatCompletionsSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<Option<String>, ToolError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(endpoint = %self.endpoint, model = %self.model, "Requesting summary");
        let response = request.send().await.map_err(ToolError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::status(
                status.as_u16(),
                format!("Summarizer returned HTTP {status}"),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(ToolError::from_reqwest)?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }
}
