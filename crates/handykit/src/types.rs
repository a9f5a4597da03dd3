//! Tool arguments and registry descriptors

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments of `add`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddArgs {
    /// First addend
    pub a: i64,
    /// Second addend
    pub b: i64,
}

/// Arguments of `usd_to_gbp`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AmountArgs {
    /// Amount in US dollars
    pub amount: f64,
}

/// Arguments of `get_height_for_16_9`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WidthArgs {
    /// Screen width
    pub width: f64,
}

/// Arguments of `calculate_bmi`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BmiArgs {
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Height in metres
    pub height_m: f64,
}

/// Arguments of `fetch_us_weather`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UsWeatherArgs {
    /// Location as "City, ST", e.g. "Seattle, WA"
    pub city_state: String,
}

/// Arguments of `fetch_international_weather`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CityArgs {
    /// City name, e.g. "London"
    pub city: String,
}

/// Arguments of the crawl tools
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LinkArgs {
    /// Page URL (http:// or https://)
    pub link: String,
}

/// Arguments of `add_note_to_file`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoteArgs {
    /// Note text
    pub message: String,
}

/// Tools that take no arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoArgs {}

/// A callable tool as advertised to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// A readable resource with a fixed URI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

/// A family of resources addressed by a URI template
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplateDefinition {
    pub uri_template: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

/// A prompt template
#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub description: &'static str,
}
