//! HandyKit - small everyday tools for AI assistants
//!
//! This crate provides the tools behind the `handykit` MCP server:
//! calculators, weather lookups, a flat-file note store and a web
//! retrieval pipeline that turns pages into size-bounded plain text.
//!
//! ## Retrieval Pipeline
//!
//! [`RetrievalPipeline`] opens a session on a pluggable [`Crawler`],
//! crawls a single URL, strips markup, removes non-ASCII characters and
//! truncates the result to a byte ceiling. An optional [`Summarizer`]
//! condenses the cleaned text first.
//!
//! Built-in implementations:
//! - [`HttpCrawler`] - Plain HTTP/HTTPS crawler
//! - [`ChatCompletionsSummarizer`] - OpenAI-compatible chat completions endpoint
//!
//! ## Tool Registry
//!
//! [`Toolkit`] advertises every tool, resource and prompt and dispatches
//! calls by name.

pub mod calc;
mod config;
pub mod crawler;
mod error;
mod notes;
mod pipeline;
mod summarize;
pub mod text;
mod tool;
mod types;
pub mod weather;

pub use calc::CalcError;
pub use config::{
    ToolkitConfig, DEFAULT_MAX_RESULT_BYTES, DEFAULT_NOTES_FILE, DEFAULT_SUMMARY_INPUT_BYTES,
};
pub use crawler::{CrawlSession, Crawler, FetchResult, HttpCrawler};
pub use error::ToolError;
pub use notes::{NotesStore, NOTE_SAVED_MESSAGE, NO_NOTES_READ_MESSAGE, NO_NOTES_YET_MESSAGE};
pub use pipeline::{
    RetrievalPipeline, EMPTY_CONTENT_MESSAGE, NO_CONTENT_MESSAGE, NO_HTML_MESSAGE,
    NO_RESULT_MESSAGE, NO_SUMMARY_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
pub use summarize::{summary_prompt, ChatCompletionsSummarizer, Summarizer};
pub use text::{sanitize, strip_markup, truncate, TRUNCATION_MARKER};
pub use tool::{ToolCallError, Toolkit, ToolkitBuilder};
pub use types::{
    AddArgs, AmountArgs, BmiArgs, CityArgs, LinkArgs, NoArgs, NoteArgs, PromptDefinition,
    ResourceDefinition, ResourceTemplateDefinition, ToolDefinition, UsWeatherArgs, WidthArgs,
};
pub use weather::{WeatherClient, WeatherEndpoints};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "HandyKit/1.0";

/// Server description for LLM consumption
pub const TOOLKIT_DESCRIPTION: &str = r#"Everyday helper tools: calculators, weather, notes and web page retrieval.

- Arithmetic, currency and screen-ratio calculators plus BMI
- Current weather for US and international cities
- A persistent sticky-note file
- Web pages as cleaned, size-bounded text"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOLKIT_LLMTXT: &str = r#"# HandyKit Tools

Everyday helper tools exposed over the Model Context Protocol.

## Tools
- `add` (`a`, `b`): Sum of two integers
- `usd_to_gbp` (`amount`): US dollars to pounds sterling at a fixed rate, 2 decimals
- `get_height_for_16_9` (`width`): Height of a 16:9 screen
- `calculate_bmi` (`weight_kg`, `height_m`): Body mass index
- `fetch_us_weather` (`city_state`): Current forecast for "City, ST"
- `fetch_international_weather` (`city`): Current weather anywhere
- `crawl_web` (`link`): Page text with markup removed
- `crawl_web_raw` (`link`): Page HTML
- `crawl_web_summarized` (`link`): Summary of the page text (only when a summarizer is configured)
- `add_note_to_file` (`message`): Append a note
- `read_note_in_a_file`: Read every note

## Resources
- `notes://latest`: The most recent note
- `greeting://{name}`: A personalized greeting

## Prompts
- `note_summary`: Ask for a summary of the current notes

## Output
All crawl results are ASCII-only and capped in size. Oversized output ends
with the marker `...[truncated]`.

## Examples

### Crawl a page
```json
{"name": "crawl_web", "arguments": {"link": "https://example.com"}}
```

### Weather in London
```json
{"name": "fetch_international_weather", "arguments": {"city": "London"}}
```

## Error Handling
- Crawl failures return `[crawl_web error] <Kind>: <message>` or a short status line
- Weather failures return a line starting with `Error:`
- Invalid arguments are reported as protocol errors
"#;
