use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{Condition, Coordinates, MainReadings, UnitSystem, WeatherSnapshot, Wind},
};

use super::WeatherApi;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Replace the HTTP client with one that gives up after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;
        Ok(self)
    }

    fn weather_url(&self) -> String {
        format!("{}/weather", self.base_url)
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn fetch_weather(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError> {
        let url = self.weather_url();
        tracing::debug!(
            %url,
            lat = coords.latitude,
            lon = coords.longitude,
            %units,
            "requesting current weather"
        );

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("units", units.as_str().to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenWeather request failed: {e}");
                FetchError::Network(e)
            })?;

        let status = res.status();
        if !status.is_success() {
            // Non-2xx is always `Http`, even when the body cannot be read.
            let body = res.text().await.unwrap_or_default();
            match status.as_u16() {
                400 => tracing::error!(
                    "OpenWeather rejected the request (400 Bad Request): {}",
                    truncate_body(&body)
                ),
                404 => tracing::error!(
                    "OpenWeather endpoint not found (404): {}",
                    truncate_body(&body)
                ),
                _ => tracing::error!("OpenWeather request failed with status {status}"),
            }
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = res.text().await.map_err(FetchError::Network)?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenWeather current JSON: {e}");
            FetchError::Malformed(e.to_string())
        })?;

        let snapshot = WeatherSnapshot::try_from(parsed)?;
        tracing::debug!(location = %snapshot.location_name, "parsed current weather");

        Ok(snapshot)
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    name: String,
    sys: OwSys,
}

impl TryFrom<OwCurrentResponse> for WeatherSnapshot {
    type Error = FetchError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        if parsed.weather.is_empty() {
            return Err(FetchError::Malformed(
                "OpenWeather response contained no weather conditions".to_string(),
            ));
        }

        Ok(WeatherSnapshot {
            conditions: parsed
                .weather
                .into_iter()
                .map(|w| Condition {
                    main: w.main,
                    description: w.description,
                    icon: w.icon,
                })
                .collect(),
            main: MainReadings {
                temp: parsed.main.temp,
                humidity: parsed.main.humidity,
                temp_min: parsed.main.temp_min,
                temp_max: parsed.main.temp_max,
            },
            wind: Wind {
                speed: parsed.wind.speed,
            },
            location_name: parsed.name,
            country_code: parsed.sys.country,
            sunrise_unix_seconds: parsed.sys.sunrise,
            sunset_unix_seconds: parsed.sys.sunset,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
