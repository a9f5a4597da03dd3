//! Weather lookups
//!
//! Two chains of JSON API calls:
//! - US: Nominatim geocode → NWS `points` → NWS forecast
//! - International: Open-Meteo geocode → Open-Meteo current weather
//!
//! Both return a formatted report or an `Error: ...` string, never an error.

use crate::config::ToolkitConfig;
use crate::error::ToolError;
use reqwest::header::{HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

/// Base URLs of the weather services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherEndpoints {
    /// Nominatim geocoder (US lookups)
    pub nominatim: String,
    /// National Weather Service API
    pub nws: String,
    /// Open-Meteo geocoder
    pub geocoding: String,
    /// Open-Meteo forecast API
    pub forecast: String,
}

impl Default for WeatherEndpoints {
    fn default() -> Self {
        Self {
            nominatim: "https://nominatim.openstreetmap.org".to_string(),
            nws: "https://api.weather.gov".to_string(),
            geocoding: "https://geocoding-api.open-meteo.com".to_string(),
            forecast: "https://api.open-meteo.com".to_string(),
        }
    }
}

impl WeatherEndpoints {
    /// Route every service to one base URL (useful against a mock server)
    pub fn all(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            nominatim: base.clone(),
            nws: base.clone(),
            geocoding: base.clone(),
            forecast: base,
        }
    }
}

/// Compass labels, clockwise from north
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Map wind bearing in degrees to one of 16 compass labels
pub fn wind_direction(degrees: f64) -> &'static str {
    let sector = (degrees / 22.5).round_ties_even() as i64;
    COMPASS_POINTS[sector.rem_euclid(16) as usize]
}

/// Describe a WMO weather interpretation code
pub fn weather_code_description(code: u32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct NwsPoints {
    properties: NwsPointsProperties,
}

#[derive(Debug, Deserialize)]
struct NwsPointsProperties {
    forecast: String,
}

#[derive(Debug, Deserialize)]
struct NwsForecast {
    properties: NwsForecastProperties,
}

#[derive(Debug, Deserialize)]
struct NwsForecastProperties {
    #[serde(default)]
    periods: Vec<NwsPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsPeriod {
    #[serde(default)]
    name: String,
    temperature: f64,
    temperature_unit: String,
    #[serde(default)]
    wind_speed: String,
    #[serde(default)]
    wind_direction: String,
    #[serde(default)]
    short_forecast: String,
    #[serde(default)]
    detailed_forecast: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingPlace>,
}

#[derive(Debug, Deserialize)]
struct GeocodingPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: u32,
}

/// Client for both weather chains
#[derive(Debug, Clone)]
pub struct WeatherClient {
    config: ToolkitConfig,
}

impl WeatherClient {
    /// Create a client using the endpoints, agent and timeouts of `config`
    pub fn new(config: &ToolkitConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Current forecast for a US location given as `"City, ST"`
    pub async fn us_weather(&self, city_state: &str) -> String {
        let location = city_state.trim();
        if !location.contains(',') {
            return "Error: Please provide the location as 'City, ST' (for example 'Seattle, WA')"
                .to_string();
        }

        match self.fetch_us_weather(location).await {
            Ok(report) => report,
            Err(e) => {
                warn!(location, error = %e, "US weather lookup failed");
                render_weather_error(location, &e)
            }
        }
    }

    /// Current conditions for a city anywhere
    pub async fn international_weather(&self, city: &str) -> String {
        let city = city.trim();
        if city.is_empty() {
            return "Error: Please provide a city name".to_string();
        }

        match self.fetch_international_weather(city).await {
            Ok(report) => report,
            Err(e) => {
                warn!(city, error = %e, "International weather lookup failed");
                render_weather_error(city, &e)
            }
        }
    }

    async fn fetch_us_weather(&self, location: &str) -> Result<String, ToolError> {
        let client = self.client()?;
        let endpoints = &self.config.weather;

        let search = endpoint_url(
            &endpoints.nominatim,
            "/search",
            &[
                ("q", location),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "us"),
            ],
        )?;
        let places: Vec<NominatimPlace> = get_json(&client, search).await?;
        let place = places.into_iter().next().ok_or_else(|| {
            ToolError::status(404, format!("No geocoding match for {location}"))
        })?;

        let lat: f64 = place.lat.parse().map_err(|_| {
            ToolError::MalformedResponse(format!("invalid latitude '{}'", place.lat))
        })?;
        let lon: f64 = place.lon.parse().map_err(|_| {
            ToolError::MalformedResponse(format!("invalid longitude '{}'", place.lon))
        })?;
        debug!(location, lat, lon, "Geocoded US location");

        let points_url = endpoint_url(&endpoints.nws, &format!("/points/{lat:.4},{lon:.4}"), &[])?;
        let points: NwsPoints = get_json(&client, points_url).await?;

        let forecast_url = Url::parse(&points.properties.forecast).map_err(|e| {
            ToolError::MalformedResponse(format!("invalid forecast URL: {e}"))
        })?;
        let forecast: NwsForecast = get_json(&client, forecast_url).await?;

        let period = forecast
            .properties
            .periods
            .first()
            .ok_or_else(|| ToolError::MalformedResponse("forecast has no periods".to_string()))?;

        Ok(format_us_report(location, period))
    }

    async fn fetch_international_weather(&self, city: &str) -> Result<String, ToolError> {
        let client = self.client()?;
        let endpoints = &self.config.weather;

        let search = endpoint_url(
            &endpoints.geocoding,
            "/v1/search",
            &[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ],
        )?;
        let geocoded: GeocodingResponse = get_json(&client, search).await?;
        let place = geocoded
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::status(404, format!("No geocoding match for {city}")))?;
        debug!(city, lat = place.latitude, lon = place.longitude, "Geocoded city");

        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();
        let current_url = endpoint_url(
            &endpoints.forecast,
            "/v1/forecast",
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current_weather", "true"),
            ],
        )?;
        let current: CurrentWeatherResponse = get_json(&client, current_url).await?;

        Ok(format_international_report(&place, &current.current_weather))
    }

    fn client(&self) -> Result<reqwest::Client, ToolError> {
        self.config
            .http_client()
            .map_err(|e| ToolError::InternalFailure(format!("Failed to create HTTP client: {e}")))
    }
}

/// Join `base` and `path` and append query parameters
fn endpoint_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, ToolError> {
    let joined = format!("{}{}", base.trim_end_matches('/'), path);
    let url = if params.is_empty() {
        Url::parse(&joined)
    } else {
        Url::parse_with_params(&joined, params)
    };
    url.map_err(|e| ToolError::InternalFailure(format!("invalid endpoint URL '{joined}': {e}")))
}

/// GET `url` and decode its JSON body
async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: Url) -> Result<T, ToolError> {
    let response = client
        .get(url)
        .header(ACCEPT, HeaderValue::from_static("application/json, application/geo+json"))
        .send()
        .await
        .map_err(ToolError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ToolError::status(status.as_u16(), format!("HTTP {status}")));
    }

    response.json::<T>().await.map_err(ToolError::from_reqwest)
}

fn render_weather_error(location: &str, err: &ToolError) -> String {
    match err {
        ToolError::UpstreamFailure {
            status: Some(404), ..
        } => format!("Error: Location '{location}' not found"),
        ToolError::UpstreamFailure {
            status: Some(code), ..
        } => format!("Error: Weather service returned HTTP status {code}"),
        ToolError::UpstreamFailure { message, .. } => format!("Error: {message}"),
        ToolError::TransportFailure(message) => {
            format!("Error: Could not connect to weather service: {message}")
        }
        ToolError::MalformedResponse(message) => {
            format!("Error: Unexpected response format from weather service: {message}")
        }
        ToolError::InternalFailure(message) => format!("Error: {message}"),
    }
}

fn format_us_report(location: &str, period: &NwsPeriod) -> String {
    let mut output = format!("Current weather in {location}:\n");
    if !period.name.is_empty() {
        output.push_str(&format!("Period: {}\n", period.name));
    }
    output.push_str(&format!(
        "Temperature: {}\u{b0}{}\n",
        period.temperature, period.temperature_unit
    ));
    output.push_str(&format!(
        "Wind: {} {}\n",
        period.wind_speed, period.wind_direction
    ));
    output.push_str(&format!("Conditions: {}", period.short_forecast));
    if !period.detailed_forecast.is_empty() {
        output.push_str(&format!("\nForecast: {}", period.detailed_forecast));
    }
    output
}

fn format_international_report(place: &GeocodingPlace, current: &CurrentWeather) -> String {
    let name = match place.country {
        Some(ref country) => format!("{}, {}", place.name, country),
        None => place.name.clone(),
    };
    format!(
        "Current weather in {}:\nTemperature: {}\u{b0}C\n\
         Wind: {} km/h {} ({}\u{b0})\nConditions: {}",
        name,
        current.temperature,
        current.windspeed,
        wind_direction(current.winddirection),
        current.winddirection,
        weather_code_description(current.weathercode)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_direction_cardinals() {
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(90.0), "E");
        assert_eq!(wind_direction(180.0), "S");
        assert_eq!(wind_direction(270.0), "W");
        assert_eq!(wind_direction(45.0), "NE");
        assert_eq!(wind_direction(360.0), "N");
    }

    #[test]
    fn test_wind_direction_intermediate() {
        assert_eq!(wind_direction(22.5), "NNE");
        assert_eq!(wind_direction(230.0), "SW");
        assert_eq!(wind_direction(349.0), "N");
        assert_eq!(wind_direction(-90.0), "W");
        // Halfway between sectors rounds to even, like banker's rounding
        assert_eq!(wind_direction(11.25), "N");
        assert_eq!(wind_direction(33.75), "NE");
    }

    #[test]
    fn test_weather_code_description() {
        assert_eq!(weather_code_description(0), "Clear sky");
        assert_eq!(weather_code_description(3), "Overcast");
        assert_eq!(weather_code_description(81), "Rain showers");
        assert_eq!(weather_code_description(99), "Thunderstorm with hail");
        assert_eq!(weather_code_description(42), "Unknown");
    }

    #[test]
    fn test_endpoint_url() {
        let url = endpoint_url("https://example.com/", "/v1/search", &[("name", "S\u{e3}o Paulo")])
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/v1/search?name=S%C3%A3o+Paulo");

        let url =
            endpoint_url("https://api.weather.gov", "/points/47.6062,-122.3321", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.weather.gov/points/47.6062,-122.3321");

        assert!(endpoint_url("not a url", "/x", &[]).is_err());
    }

    #[test]
    fn test_render_weather_error() {
        assert_eq!(
            render_weather_error("Nowhere, ZZ", &ToolError::status(404, "x")),
            "Error: Location 'Nowhere, ZZ' not found"
        );
        assert_eq!(
            render_weather_error("Paris", &ToolError::status(503, "x")),
            "Error: Weather service returned HTTP status 503"
        );
        assert_eq!(
            render_weather_error("Paris", &ToolError::TransportFailure("refused".into())),
            "Error: Could not connect to weather service: refused"
        );
        assert_eq!(
            render_weather_error("Paris", &ToolError::MalformedResponse("missing field".into())),
            "Error: Unexpected response format from weather service: missing field"
        );
    }

    #[test]
    fn test_format_us_report() {
        let period = NwsPeriod {
            name: "Tonight".into(),
            temperature: 48.0,
            temperature_unit: "F".into(),
            wind_speed: "5 mph".into(),
            wind_direction: "S".into(),
            short_forecast: "Mostly Cloudy".into(),
            detailed_forecast: "Mostly cloudy, with a low around 48.".into(),
        };
        assert_eq!(
            format_us_report("Seattle, WA", &period),
            "Current weather in Seattle, WA:\n\
             Period: Tonight\n\
             Temperature: 48\u{b0}F\n\
             Wind: 5 mph S\n\
             Conditions: Mostly Cloudy\n\
             Forecast: Mostly cloudy, with a low around 48."
        );
    }

    #[test]
    fn test_format_international_report() {
        let place = GeocodingPlace {
            name: "London".into(),
            latitude: 51.5,
            longitude: -0.12,
            country: Some("United Kingdom".into()),
        };
        let current = CurrentWeather {
            temperature: 12.5,
            windspeed: 15.2,
            winddirection: 230.0,
            weathercode: 3,
        };
        assert_eq!(
            format_international_report(&place, &current),
            "Current weather in London, United Kingdom:\n\
             Temperature: 12.5\u{b0}C\n\
             Wind: 15.2 km/h SW (230\u{b0})\n\
             Conditions: Overcast"
        );
    }

    #[tokio::test]
    async fn test_us_weather_requires_comma() {
        let client = WeatherClient::new(&ToolkitConfig::default());
        let result = client.us_weather("Seattle").await;
        assert!(result.starts_with("Error:"));
        assert!(result.contains("City, ST"));
    }

    #[tokio::test]
    async fn test_international_weather_requires_city() {
        let client = WeatherClient::new(&ToolkitConfig::default());
        assert_eq!(
            client.international_weather("  ").await,
            "Error: Please provide a city name"
        );
    }
}
