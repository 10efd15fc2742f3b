use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::Config,
    error::{
        MISSING_CURRENT_MESSAGE, SEARCH_FAILED_MESSAGE, WEATHER_FAILED_MESSAGE, WeatherError,
    },
    model::{CurrentWeather, GeoLocation, WeatherSnapshot},
};

use super::WeatherGateway;

/// Upper bound on geocoding matches per search.
pub const SEARCH_RESULT_LIMIT: u8 = 5;

const USER_AGENT: &str = concat!("sunnyweather/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
    language: String,
}

impl OpenMeteoProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            language: config.language.clone(),
        })
    }

    /// GET `url` and return the body of a successful response.
    ///
    /// Any failure is logged and mapped to `Network(user_message)`.
    async fn get_body(
        &self,
        url: &str,
        query: &[(&str, String)],
        user_message: &str,
    ) -> Result<String, WeatherError> {
        tracing::debug!(url, ?query, "sending Open-Meteo request");

        let res = self.http.get(url).query(query).send().await.map_err(|e| {
            tracing::warn!(url, error = %e, "Open-Meteo request failed");
            WeatherError::Network(user_message.to_string())
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::warn!(url, error = %e, "failed to read Open-Meteo response body");
            WeatherError::Network(user_message.to_string())
        })?;

        if !status.is_success() {
            tracing::warn!(url, %status, body = %truncate_body(&body), "Open-Meteo returned an error");
            return Err(WeatherError::Network(user_message.to_string()));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OmGeoResult {
    id: u64,
    name: String,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmGeoResponse {
    #[serde(default)]
    results: Option<Vec<OmGeoResult>>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: i32,
    time: String,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    #[serde(default)]
    current_weather: Option<OmCurrentWeather>,
}

impl From<OmGeoResult> for GeoLocation {
    fn from(r: OmGeoResult) -> Self {
        GeoLocation {
            id: r.id.to_string(),
            name: r.name,
            country: r.country.unwrap_or_default(),
            latitude: r.latitude,
            longitude: r.longitude,
            timezone: r.timezone.unwrap_or_default(),
        }
    }
}

impl From<OmCurrentWeather> for CurrentWeather {
    fn from(c: OmCurrentWeather) -> Self {
        CurrentWeather {
            temperature: c.temperature,
            windspeed: c.windspeed,
            winddirection: c.winddirection,
            weathercode: c.weathercode,
            time: c.time,
        }
    }
}

#[async_trait]
impl WeatherGateway for OpenMeteoProvider {
    async fn search(&self, query: &str) -> Result<Vec<GeoLocation>, WeatherError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .get_body(
                &self.geocoding_url,
                &[
                    ("name", trimmed.to_string()),
                    ("count", SEARCH_RESULT_LIMIT.to_string()),
                    ("language", self.language.clone()),
                    ("format", "json".to_string()),
                ],
                SEARCH_FAILED_MESSAGE,
            )
            .await?;

        let parsed: OmGeoResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, body = %truncate_body(&body), "failed to parse geocoding JSON");
            WeatherError::Parse(SEARCH_FAILED_MESSAGE.to_string())
        })?;

        let locations: Vec<GeoLocation> =
            parsed.results.unwrap_or_default().into_iter().map(GeoLocation::from).collect();

        tracing::debug!(query = trimmed, matches = locations.len(), "geocoding finished");
        Ok(locations)
    }

    async fn fetch_current(&self, location: &GeoLocation) -> Result<WeatherSnapshot, WeatherError> {
        let timezone = match location.timezone.trim() {
            "" => "auto",
            tz => tz,
        };

        let body = self
            .get_body(
                &self.forecast_url,
                &[
                    ("latitude", location.latitude.to_string()),
                    ("longitude", location.longitude.to_string()),
                    ("current_weather", "true".to_string()),
                    ("timezone", timezone.to_string()),
                ],
                WEATHER_FAILED_MESSAGE,
            )
            .await?;

        let parsed: OmForecastResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, body = %truncate_body(&body), "failed to parse forecast JSON");
            WeatherError::Parse(WEATHER_FAILED_MESSAGE.to_string())
        })?;

        let current = parsed.current_weather.ok_or_else(|| {
            tracing::warn!(location = %location.id, "forecast response has no current_weather block");
            WeatherError::MissingData(MISSING_CURRENT_MESSAGE.to_string())
        })?;

        Ok(WeatherSnapshot { location: location.clone(), current: current.into() })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocoding_result_maps_numeric_id_to_string() {
        let parsed: OmGeoResponse = serde_json::from_str(
            r#"{"results":[{"id":703448,"name":"Kyiv","country":"Ukraine",
                "latitude":50.45,"longitude":30.52,"timezone":"Europe/Kyiv"}]}"#,
        )
        .expect("valid geocoding JSON");

        let loc = GeoLocation::from(parsed.results.expect("results").remove(0));
        assert_eq!(loc.id, "703448");
        assert_eq!(loc.timezone, "Europe/Kyiv");
    }

    #[test]
    fn geocoding_without_results_key_parses() {
        let parsed: OmGeoResponse =
            serde_json::from_str(r#"{"generationtime_ms":0.5}"#).expect("valid JSON");
        assert!(parsed.results.is_none());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "й".repeat(300);
        let cut = truncate_body(&long);

        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn blank_query_returns_empty_without_request() {
        // Unroutable base URL: any request would fail.
        let cfg = Config { geocoding_url: "http://127.0.0.1:1/v1/search".into(), ..Config::default() };
        let provider = OpenMeteoProvider::new(&cfg).expect("client");

        for query in ["", "   ", "\t\n"] {
            assert!(provider.search(query).await.expect("no error").is_empty());
        }
    }
}
