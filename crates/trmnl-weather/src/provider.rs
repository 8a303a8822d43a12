//! WeatherAPI.com client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::instrument;
use trmnl_core::{NetworkError, ReqwestErrorExt, WeatherApiConfig, WeatherError};

use crate::types::WeatherResponse;

/// WeatherAPI.com caps forecasts at 14 days
const MAX_FORECAST_DAYS: u32 = 14;

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &WeatherApiConfig) -> Result<Self, WeatherError> {
        Self::new(&config.api_key, &config.base_url, config.timeout())
    }

    /// Fetch current conditions for a location.
    #[instrument(skip(self), level = "info")]
    pub async fn current(
        &self,
        location: &str,
        include_air_quality: bool,
    ) -> Result<WeatherResponse, WeatherError> {
        let url = format!("{}/current.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("aqi", aqi_flag(include_air_quality)),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        self.handle_response(response, location).await
    }

    /// Fetch current conditions plus a `days`-day forecast (clamped to 1..=14).
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(
        &self,
        location: &str,
        days: u32,
        include_air_quality: bool,
    ) -> Result<WeatherResponse, WeatherError> {
        let url = format!("{}/forecast.json", self.base_url);
        let days = days.clamp(1, MAX_FORECAST_DAYS).to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("days", days.as_str()),
                ("aqi", aqi_flag(include_air_quality)),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        self.handle_response(response, location).await
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
        location: &str,
    ) -> Result<WeatherResponse, WeatherError> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| WeatherError::Network(e.into_network_error()))?;
            return serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()));
        }

        let text = response.text().await.unwrap_or_default();
        tracing::error!("Weather API error: {} - {}", status, text);

        match status.as_u16() {
            401 | 403 => Err(WeatherError::InvalidApiKey),
            // WeatherAPI answers unknown locations with 400 / code 1006
            400 => Err(WeatherError::LocationNotFound(location.to_string())),
            code if code >= 500 => Err(WeatherError::Network(NetworkError::ServerError {
                status: code,
                message: text,
            })),
            _ => Err(WeatherError::ApiError(format!("{}: {}", status, text))),
        }
    }
}

fn aqi_flag(include_air_quality: bool) -> &'static str {
    if include_air_quality {
        "yes"
    } else {
        "no"
    }
}
