//! Configuration shared by the tools
//!
//! Everything a tool needs from its environment is passed in through
//! [`ToolkitConfig`] at construction time.

use crate::weather::WeatherEndpoints;
use crate::DEFAULT_USER_AGENT;
use std::path::PathBuf;
use std::time::Duration;

/// Default byte ceiling for tool output
pub const DEFAULT_MAX_RESULT_BYTES: usize = 300_000;

/// Byte ceiling for page content handed to the summarizer
pub const DEFAULT_SUMMARY_INPUT_BYTES: usize = 3_000;

/// Default notes file, relative to the working directory
pub const DEFAULT_NOTES_FILE: &str = "handykit_notes.txt";

/// Connect timeout for outbound requests
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for receiving a response body
const DEFAULT_BODY_TIMEOUT: Duration = Duration::from_secs(30);

/// Toolkit configuration
#[derive(Debug, Clone)]
pub struct ToolkitConfig {
    /// File backing the notes store
    pub notes_path: PathBuf,
    /// Maximum UTF-8 bytes of any crawl result
    pub max_result_bytes: usize,
    /// Maximum UTF-8 bytes of content put into a summary prompt
    pub summary_input_bytes: usize,
    /// User-Agent for every outbound request
    pub user_agent: String,
    /// Connect timeout for outbound requests
    pub connect_timeout: Duration,
    /// Deadline for a response body
    pub body_timeout: Duration,
    /// Weather service base URLs
    pub weather: WeatherEndpoints,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            notes_path: PathBuf::from(DEFAULT_NOTES_FILE),
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            summary_input_bytes: DEFAULT_SUMMARY_INPUT_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            body_timeout: DEFAULT_BODY_TIMEOUT,
            weather: WeatherEndpoints::default(),
        }
    }
}

impl ToolkitConfig {
    /// Set the notes file
    pub fn with_notes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.notes_path = path.into();
        self
    }

    /// Set the output byte ceiling
    pub fn with_max_result_bytes(mut self, max_bytes: usize) -> Self {
        self.max_result_bytes = max_bytes;
        self
    }

    /// Set the summary prompt byte ceiling
    pub fn with_summary_input_bytes(mut self, max_bytes: usize) -> Self {
        self.summary_input_bytes = max_bytes;
        self
    }

    /// Set custom User-Agent
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Set connect timeout and body deadline
    pub fn with_timeouts(mut self, connect: Duration, body: Duration) -> Self {
        self.connect_timeout = connect;
        self.body_timeout = body;
        self
    }

    /// Point the weather tools at other services
    pub fn with_weather_endpoints(mut self, endpoints: WeatherEndpoints) -> Self {
        self.weather = endpoints;
        self
    }

    /// Build a reqwest client honouring the agent and timeouts
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .connect_timeout(self.connect_timeout)
            .timeout(self.body_timeout)
            .build()
    }
}
