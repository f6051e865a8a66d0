//! get_weather tool: current conditions from Open-Meteo (no API key)

use futures::future::join_all;
use mcpbot_domain::tool::{
    entities::{ToolAnnotations, ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Tool name constant
pub const GET_WEATHER: &str = "get_weather";

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m";

/// Get the tool definition for get_weather
pub fn get_weather_definition() -> ToolDefinition {
    ToolDefinition::new(
        GET_WEATHER,
        "Get current weather for one or multiple cities",
    )
    .with_annotations(
        ToolAnnotations::titled("The Weather Tool")
            .read_only()
            .idempotent()
            .open_world(),
    )
    .with_parameter(
        ToolParameter::new(
            "cities",
            "List of city names (e.g., [\"Paris\", \"London\", \"Tokyo\"])",
            true,
        )
        .array_of("string"),
    )
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Location>,
}

#[derive(Debug, Clone, Deserialize)]
struct Location {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    precipitation: f64,
    weather_code: i64,
    wind_speed_10m: f64,
}

fn summarize(location: &Location, current: &CurrentConditions) -> Value {
    json!({
        "city": location.name,
        "country": location.country.as_deref().unwrap_or("Unknown"),
        "temperature": format!("{}°C", current.temperature_2m),
        "feels_like": format!("{}°C", current.apparent_temperature),
        "humidity": format!("{}%", current.relative_humidity_2m),
        "wind_speed": format!("{} km/h", current.wind_speed_10m),
        "precipitation": format!("{} mm", current.precipitation),
        "weather_code": current.weather_code,
    })
}

async fn fetch_city(client: &reqwest::Client, city: &str) -> Result<Value, String> {
    let geo: GeocodingResponse = client
        .get(GEOCODING_URL)
        .query(&[("name", city), ("count", "1")])
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("Failed to fetch weather: {}", e))?
        .json()
        .await
        .map_err(|e| format!("Failed to fetch weather: {}", e))?;

    let Some(location) = geo.results.into_iter().next() else {
        return Err(format!("City '{}' not found", city));
    };

    let forecast: ForecastResponse = client
        .get(FORECAST_URL)
        .query(&[
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
        ])
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("Failed to fetch weather: {}", e))?
        .json()
        .await
        .map_err(|e| format!("Failed to fetch weather: {}", e))?;

    Ok(summarize(&location, &forecast.current))
}

/// Execute the get_weather tool
///
/// Cities are looked up concurrently; a failing city only spoils its own entry.
pub async fn execute_get_weather(client: &reqwest::Client, call: &ToolCall) -> ToolResult {
    let cities = match call.get_string_list("cities") {
        Some(cities) if !cities.is_empty() => cities,
        _ => {
            return ToolResult::failure(
                GET_WEATHER,
                ToolError::invalid_argument("cities must be a non-empty list of names"),
            );
        }
    };

    debug!(count = cities.len(), "Fetching weather");
    let lookups = join_all(cities.iter().map(|city| fetch_city(client, city))).await;

    let mut results = Map::new();
    for (city, lookup) in cities.into_iter().zip(lookups) {
        let entry = lookup.unwrap_or_else(|error| json!({ "error": error }));
        results.insert(city, entry);
    }

    ToolResult::json(GET_WEATHER, Value::Object(results))
}
