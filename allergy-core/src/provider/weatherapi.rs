use anyhow::{Context, Result};
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

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_current(&self, query: &str) -> Result<WeatherSnapshot> {
        let url = format!("{}/v1/current.json", self.base_url);

        tracing::debug!(query, "requesting WeatherAPI current conditions");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", query)])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WaResponse =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI current JSON")?;

        let location_name = format!("{}, {}", parsed.location.name, parsed.location.country);
        let wind_speed_mps = parsed.current.wind_kph / 3.6;

        Ok(WeatherSnapshot {
            provider: "weatherapi".to_string(),
            location_name,
            temperature_c: parsed.current.temp_c,
            humidity_pct: parsed.current.humidity,
            description: human_case(&parsed.current.condition.text),
            wind_speed_mps,
            // A real UV index is available here, so no proxy is needed.
            uv_proxy: parsed.current.uv,
            pressure_hpa: parsed.current.pressure_mb,
            observed_at: Utc::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    pressure_mb: f64,
    uv: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherSnapshot> {
        self.fetch_current(&request.query()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn current_weather_converts_wind_to_meters_per_second() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("q", "Merida"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": { "name": "Merida", "country": "Mexico" },
                "current": {
                    "temp_c": 33.0,
                    "humidity": 65,
                    "wind_kph": 36.0,
                    "pressure_mb": 1012.0,
                    "uv": 9.0,
                    "condition": { "text": "Partly cloudy" }
                }
            })))
            .mount(&server)
            .await;

        let provider =
            WeatherApiProvider::with_base_url("KEY".into(), &server.uri(), Duration::from_secs(5))
                .unwrap();
        let snapshot = provider.get_weather(&WeatherRequest::new("Merida", None)).await.unwrap();

        assert_eq!(snapshot.location_name, "Merida, Mexico");
        assert!((snapshot.wind_speed_mps - 10.0).abs() < 1e-9);
        assert_eq!(snapshot.uv_proxy, 9.0);
        assert_eq!(snapshot.pressure_hpa, 1012.0);
        assert_eq!(snapshot.description, "Partly cloudy");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let provider =
            WeatherApiProvider::with_base_url("BAD".into(), &server.uri(), Duration::from_secs(5))
                .unwrap();
        let err = provider.get_weather(&WeatherRequest::new("Merida", None)).await.unwrap_err();

        assert!(err.to_string().contains("401"));
    }
}
