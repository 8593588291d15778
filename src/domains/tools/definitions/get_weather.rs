//! Weather lookup tool.
//!
//! Resolves a city name to coordinates through an external geocoding API,
//! then fetches the current conditions from a forecast API (Open-Meteo
//! shaped; base URLs come from configuration). A city the geocoder does not
//! know is a domain condition answered with explanatory text; network
//! failures propagate as errors and become protocol-level server errors at
//! the dispatch boundary.

use std::sync::Arc;

use anyhow::Context;
use futures::FutureExt;
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::config::WeatherConfig;
use crate::domains::tools::definition::{ToolContent, ToolDefinition};
use crate::domains::tools::schema::{InputSchema, ParamType};

/// Geocoding API response: zero or more candidate places.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Option<Vec<GeoResult>>,
}

/// A single geocoding candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
}

/// Forecast API response; only the current conditions are used.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current_weather: Option<CurrentWeather>,
}

/// Current conditions as reported by the forecast API.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
}

/// Weather lookup tool.
pub struct GetWeatherTool;

impl GetWeatherTool {
    /// Tool name as registered.
    pub const NAME: &'static str = "get-weather";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Looks up the current weather for a city. Resolves the city by name and reports temperature and wind.";

    /// Build the tool definition against the configured collaborator URLs.
    pub fn definition(config: Arc<WeatherConfig>) -> ToolDefinition {
        let schema = InputSchema::new().required("city", ParamType::String, "The city name to look up");
        let client = reqwest::Client::new();

        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            schema,
            Arc::new(move |params| {
                let config = config.clone();
                let client = client.clone();
                async move {
                    let city = params
                        .get("city")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();

                    let text = Self::execute(&city, &config, &client).await?;
                    Ok(vec![ToolContent::text(text)])
                }
                .boxed()
            }),
        )
    }

    /// Resolve the city and fetch current conditions.
    pub async fn execute(
        city: &str,
        config: &WeatherConfig,
        client: &reqwest::Client,
    ) -> anyhow::Result<String> {
        info!("Looking up weather for city: {}", city);

        let geocoding: GeocodingResponse = client
            .get(&config.geocoding_url)
            .query(&[("name", city), ("count", "1")])
            .send()
            .await
            .context("geocoding request failed")?
            .json()
            .await
            .context("geocoding response was not valid JSON")?;

        let Some(place) = Self::best_match(geocoding) else {
            return Ok(Self::city_not_found(city));
        };

        debug!(
            "Resolved '{}' to {} ({}, {})",
            city, place.name, place.latitude, place.longitude
        );

        let forecast: ForecastResponse = client
            .get(&config.forecast_url)
            .query(&[
                ("latitude", place.latitude.to_string()),
                ("longitude", place.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?
            .json()
            .await
            .context("forecast response was not valid JSON")?;

        let Some(current) = forecast.current_weather else {
            anyhow::bail!("forecast response contained no current weather");
        };

        Ok(Self::report(&place, &current))
    }

    /// Pick the first geocoding candidate, if any.
    pub fn best_match(response: GeocodingResponse) -> Option<GeoResult> {
        response.results.and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
    }

    /// Text for a city the geocoder could not resolve.
    pub fn city_not_found(city: &str) -> String {
        format!("Sorry, I couldn't find a city named '{city}'.")
    }

    /// Text report of the current conditions at a resolved place.
    pub fn report(place: &GeoResult, current: &CurrentWeather) -> String {
        let location = match &place.country {
            Some(country) => format!("{}, {}", place.name, country),
            None => place.name.clone(),
        };
        format!(
            "Current weather in {location}: {:.1}\u{b0}C, wind {:.1} km/h.",
            current.temperature, current.windspeed
        )
    }
}
