//! Tool registry and builder for HandyKit

use crate::calc::{self, CalcError};
use crate::config::ToolkitConfig;
use crate::crawler::{Crawler, HttpCrawler};
use crate::error::ToolError;
use crate::notes::NotesStore;
use crate::pipeline::RetrievalPipeline;
use crate::summarize::Summarizer;
use crate::types::{
    AddArgs, AmountArgs, BmiArgs, CityArgs, LinkArgs, NoArgs, NoteArgs, PromptDefinition,
    ResourceDefinition, ResourceTemplateDefinition, ToolDefinition, UsWeatherArgs, WidthArgs,
};
use crate::weather::WeatherClient;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const ADD_TOOL: &str = "add";
pub const USD_TO_GBP_TOOL: &str = "usd_to_gbp";
pub const HEIGHT_16_9_TOOL: &str = "get_height_for_16_9";
pub const BMI_TOOL: &str = "calculate_bmi";
pub const US_WEATHER_TOOL: &str = "fetch_us_weather";
pub const INTERNATIONAL_WEATHER_TOOL: &str = "fetch_international_weather";
pub const CRAWL_TOOL: &str = "crawl_web";
pub const CRAWL_RAW_TOOL: &str = "crawl_web_raw";
pub const CRAWL_SUMMARIZED_TOOL: &str = "crawl_web_summarized";
pub const ADD_NOTE_TOOL: &str = "add_note_to_file";
pub const READ_NOTES_TOOL: &str = "read_note_in_a_file";

pub const LATEST_NOTE_URI: &str = "notes://latest";
pub const GREETING_URI_PREFIX: &str = "greeting://";
pub const NOTE_SUMMARY_PROMPT: &str = "note_summary";

/// Errors raised while dispatching a call
///
/// Tool failures that have a user-facing rendering (crawl errors, weather
/// errors, notes I/O) come back as `Ok` strings instead.
#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Calc(#[from] CalcError),
}

/// Builder for configuring the toolkit
#[derive(Default)]
pub struct ToolkitBuilder {
    config: ToolkitConfig,
    crawler: Option<Arc<dyn Crawler>>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl ToolkitBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ToolkitConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the notes file
    pub fn notes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_notes_path(path);
        self
    }

    /// Set the output byte ceiling
    pub fn max_result_bytes(mut self, max_bytes: usize) -> Self {
        self.config = self.config.with_max_result_bytes(max_bytes);
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config = self.config.with_user_agent(ua);
        self
    }

    /// Use a custom crawler instead of [`HttpCrawler`]
    pub fn crawler(mut self, crawler: Arc<dyn Crawler>) -> Self {
        self.crawler = Some(crawler);
        self
    }

    /// Enable the summarizing crawl tool
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Build the toolkit
    pub fn build(self) -> Toolkit {
        let crawler = self
            .crawler
            .unwrap_or_else(|| Arc::new(HttpCrawler::from_config(&self.config)));

        Toolkit {
            pipeline: RetrievalPipeline::new(crawler, &self.config),
            weather: WeatherClient::new(&self.config),
            notes: NotesStore::new(self.config.notes_path.clone()),
            summarizer: self.summarizer,
            config: self.config,
        }
    }
}

/// Configured set of tools, resources and prompts
#[derive(Clone)]
pub struct Toolkit {
    config: ToolkitConfig,
    pipeline: RetrievalPipeline,
    weather: WeatherClient,
    notes: NotesStore,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl Default for Toolkit {
    fn default() -> Self {
        ToolkitBuilder::new().build()
    }
}

impl Toolkit {
    /// Create a new toolkit builder
    pub fn builder() -> ToolkitBuilder {
        ToolkitBuilder::new()
    }

    /// Active configuration
    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    /// The retrieval pipeline
    pub fn pipeline(&self) -> &RetrievalPipeline {
        &self.pipeline
    }

    /// The weather client
    pub fn weather(&self) -> &WeatherClient {
        &self.weather
    }

    /// The notes store
    pub fn notes(&self) -> &NotesStore {
        &self.notes
    }

    /// Whether the summarizing crawl tool is available
    pub fn has_summarizer(&self) -> bool {
        self.summarizer.is_some()
    }

    /// Crawl, clean and summarize `url`
    pub async fn summarize_url(&self, url: &str) -> String {
        match self.summarizer {
            Some(ref summarizer) => {
                self.pipeline
                    .retrieve_clean_and_summarize(url, summarizer.as_ref())
                    .await
            }
            None => ToolError::InternalFailure("no summarizer configured".to_string())
                .render(CRAWL_SUMMARIZED_TOOL),
        }
    }

    /// Advertised tools
    ///
    /// The summarizing crawl is only listed when a summarizer is set.
    pub fn tools(&self) -> Vec<ToolDefinition> {
        let mut tools = vec![
            tool_definition::<AddArgs>(ADD_TOOL, "Add two numbers"),
            tool_definition::<AmountArgs>(
                USD_TO_GBP_TOOL,
                "Convert USD (dollars) to GBP (pounds sterling)",
            ),
            tool_definition::<WidthArgs>(
                HEIGHT_16_9_TOOL,
                "Get the height for a given width at a 16:9 ratio",
            ),
            tool_definition::<BmiArgs>(
                BMI_TOOL,
                "Calculate BMI given weight in kg and height in meters",
            ),
            tool_definition::<UsWeatherArgs>(
                US_WEATHER_TOOL,
                "Fetch the current forecast for a US location given as 'City, ST'",
            ),
            tool_definition::<CityArgs>(
                INTERNATIONAL_WEATHER_TOOL,
                "Fetch current weather for a city anywhere in the world",
            ),
            tool_definition::<LinkArgs>(
                CRAWL_TOOL,
                "Crawl a web page and return its text with markup removed, truncated to fit size limits",
            ),
            tool_definition::<LinkArgs>(
                CRAWL_RAW_TOOL,
                "Crawl a web page and return its raw HTML, truncated to fit size limits",
            ),
        ];

        if self.summarizer.is_some() {
            tools.push(tool_definition::<LinkArgs>(
                CRAWL_SUMMARIZED_TOOL,
                "Crawl a web page, summarize its content and truncate the result to fit size limits",
            ));
        }

        tools.push(tool_definition::<NoteArgs>(
            ADD_NOTE_TOOL,
            "Append a new note to the sticky note file",
        ));
        tools.push(tool_definition::<NoArgs>(
            READ_NOTES_TOOL,
            "Read the notes in the sticky note file",
        ));
        tools
    }

    /// Resources with fixed URIs
    pub fn resources(&self) -> Vec<ResourceDefinition> {
        vec![ResourceDefinition {
            uri: LATEST_NOTE_URI,
            name: "latest_note",
            description: "The most recent note",
            mime_type: "text/plain",
        }]
    }

    /// Resource URI templates
    pub fn resource_templates(&self) -> Vec<ResourceTemplateDefinition> {
        vec![ResourceTemplateDefinition {
            uri_template: "greeting://{name}",
            name: "greeting",
            description: "A personalized greeting",
            mime_type: "text/plain",
        }]
    }

    /// Prompt templates
    pub fn prompts(&self) -> Vec<PromptDefinition> {
        vec![PromptDefinition {
            name: NOTE_SUMMARY_PROMPT,
            description: "Generate a prompt to summarize the current notes",
        }]
    }

    /// Call a tool by name with JSON arguments
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, ToolCallError> {
        debug!(tool = name, "Calling tool");

        match name {
            ADD_TOOL => {
                let args: AddArgs = parse_args(arguments)?;
                Ok(calc::add(args.a, args.b)?.to_string())
            }
            USD_TO_GBP_TOOL => {
                let args: AmountArgs = parse_args(arguments)?;
                Ok(number(calc::usd_to_gbp(args.amount))?)
            }
            HEIGHT_16_9_TOOL => {
                let args: WidthArgs = parse_args(arguments)?;
                Ok(number(calc::height_for_16_9(args.width))?)
            }
            BMI_TOOL => {
                let args: BmiArgs = parse_args(arguments)?;
                Ok(number(calc::bmi(args.weight_kg, args.height_m)?)?)
            }
            US_WEATHER_TOOL => {
                let args: UsWeatherArgs = parse_args(arguments)?;
                Ok(self.weather.us_weather(&args.city_state).await)
            }
            INTERNATIONAL_WEATHER_TOOL => {
                let args: CityArgs = parse_args(arguments)?;
                Ok(self.weather.international_weather(&args.city).await)
            }
            CRAWL_TOOL => {
                let args: LinkArgs = parse_args(arguments)?;
                Ok(self.pipeline.retrieve_and_clean(&args.link).await)
            }
            CRAWL_RAW_TOOL => {
                let args: LinkArgs = parse_args(arguments)?;
                Ok(self.pipeline.retrieve_raw(&args.link).await)
            }
            CRAWL_SUMMARIZED_TOOL if self.summarizer.is_some() => {
                let args: LinkArgs = parse_args(arguments)?;
                Ok(self.summarize_url(&args.link).await)
            }
            ADD_NOTE_TOOL => {
                let args: NoteArgs = parse_args(arguments)?;
                Ok(rendered(
                    self.notes.add_note(&args.message).map(str::to_string),
                    ADD_NOTE_TOOL,
                ))
            }
            READ_NOTES_TOOL => {
                let _: NoArgs = parse_args(arguments)?;
                Ok(rendered(self.notes.read_notes(), READ_NOTES_TOOL))
            }
            _ => Err(ToolCallError::UnknownTool(name.to_string())),
        }
    }

    /// Read a resource by URI
    pub fn read_resource(&self, uri: &str) -> Result<String, ToolCallError> {
        if uri == LATEST_NOTE_URI {
            return Ok(rendered(self.notes.latest_note(), "latest_note"));
        }

        match uri.strip_prefix(GREETING_URI_PREFIX) {
            Some(name) if !name.is_empty() => Ok(format!("Hello, {name}!")),
            _ => Err(ToolCallError::UnknownResource(uri.to_string())),
        }
    }

    /// Render a prompt by name
    pub fn get_prompt(&self, name: &str) -> Result<String, ToolCallError> {
        match name {
            NOTE_SUMMARY_PROMPT => Ok(rendered(self.notes.summary_prompt(), NOTE_SUMMARY_PROMPT)),
            _ => Err(ToolCallError::UnknownPrompt(name.to_string())),
        }
    }
}

fn tool_definition<T: JsonSchema>(name: &'static str, description: &'static str) -> ToolDefinition {
    let schema = schema_for!(T);
    ToolDefinition {
        name,
        description,
        input_schema: serde_json::to_value(schema).unwrap_or_default(),
    }
}

/// Decode tool arguments; a missing object counts as empty
fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolCallError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolCallError::InvalidArguments(e.to_string()))
}

/// Render a float the way JSON would
fn number(value: f64) -> Result<String, CalcError> {
    if !value.is_finite() {
        return Err(CalcError::Overflow);
    }
    Ok(Value::from(value).to_string())
}

fn rendered(result: Result<String, ToolError>, context: &str) -> String {
    result.unwrap_or_else(|e| e.render(context))
}
