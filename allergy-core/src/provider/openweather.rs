use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    model::{WeatherRequest, WeatherSnapshot, human_case},
    provider::truncate_body,
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout)
    }

    /// Points the provider at another host, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_current(&self, query: &str) -> Result<WeatherSnapshot> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        tracing::debug!(query, "requesting OpenWeather current conditions");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "en"),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let description = parsed
            .weather
            .first()
            .map(|w| human_case(&w.description))
            .ok_or_else(|| anyhow!("OpenWeather response contained no weather description"))?;

        Ok(WeatherSnapshot {
            provider: "openweather".to_string(),
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            description,
            wind_speed_mps: parsed.wind.speed,
            uv_proxy: parsed.main.temp_max,
            pressure_hpa: parsed.main.pressure,
            observed_at: Utc::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_max: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherSnapshot> {
        self.fetch_current(&request.query()).await
    }
}
