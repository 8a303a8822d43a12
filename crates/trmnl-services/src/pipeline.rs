//! Fetch, quote, transform and deliver.

use std::sync::Arc;

use tracing::instrument;
use trmnl_core::{AppError, Config, WebhookError};
use trmnl_quotes::QuoteService;
use trmnl_weather::{WeatherProvider, WeatherResponse};

use crate::view::TrmnlView;
use crate::webhook::TrmnlWebhook;

pub struct WeatherPipeline {
    weather: WeatherProvider,
    quotes: Option<Arc<QuoteService>>,
    webhook: Option<TrmnlWebhook>,
    include_air_quality: bool,
}

impl WeatherPipeline {
    pub fn new(
        weather: WeatherProvider,
        quotes: Option<Arc<QuoteService>>,
        webhook: Option<TrmnlWebhook>,
        include_air_quality: bool,
    ) -> Self {
        Self {
            weather,
            quotes,
            webhook,
            include_air_quality,
        }
    }

    /// Wire a pipeline from configuration. A blank webhook URL leaves the
    /// pipeline able to build views but not to push them.
    pub fn from_config(config: &Config, quotes: Option<Arc<QuoteService>>) -> Result<Self, AppError> {
        let weather = WeatherProvider::from_config(&config.weather)?;
        let webhook = match TrmnlWebhook::from_config(&config.webhook) {
            Ok(webhook) => Some(webhook),
            Err(WebhookError::NotConfigured) => {
                tracing::warn!("TRMNL webhook URL not configured; pushes are disabled");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self::new(
            weather,
            quotes,
            webhook,
            config.weather.include_air_quality,
        ))
    }

    pub fn quotes(&self) -> Option<&Arc<QuoteService>> {
        self.quotes.as_ref()
    }

    pub fn can_push(&self) -> bool {
        self.webhook.is_some()
    }

    /// Current conditions when `days` is 0, otherwise a `days`-day forecast.
    async fn fetch(&self, location: &str, days: u32) -> Result<WeatherResponse, AppError> {
        let response = if days == 0 {
            self.weather.current(location, self.include_air_quality).await?
        } else {
            self.weather
                .forecast(location, days, self.include_air_quality)
                .await?
        };
        Ok(response)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn build_view(&self, location: &str, days: u32) -> Result<TrmnlView, AppError> {
        let response = self.fetch(location, days).await?;

        let quote = match &self.quotes {
            Some(quotes) => {
                quotes
                    .lookup_quote(response.location_name(), &response.descriptor())
                    .await
            }
            None => None,
        };

        Ok(TrmnlView::transform(&response, quote))
    }

    /// Build the view and send it to the webhook. Returns the view sent.
    pub async fn push(&self, location: &str, days: u32) -> Result<TrmnlView, AppError> {
        let webhook = self.webhook.as_ref().ok_or(WebhookError::NotConfigured)?;
        let view = self.build_view(location, days).await?;
        webhook.send(&view).await?;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trmnl_quotes::{DisabledGenerator, QuotePolicy};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn weather_server(condition: &str) -> MockServer {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "location": { "name": "Oslo", "tz_id": "Europe/Oslo" },
            "current": {
                "last_updated": "2024-01-10 08:30",
                "temp_c": -4.0,
                "wind_kph": 6.0,
                "condition": { "text": condition }
            },
            "forecast": { "forecastday": [ { "day": { "maxtemp_c": -1.0, "mintemp_c": -9.0 } } ] }
        });

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("days", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        server
    }

    fn pipeline(server: &MockServer, quotes: Option<Arc<QuoteService>>) -> WeatherPipeline {
        let weather = WeatherProvider::new("key", &server.uri(), Duration::from_secs(5)).unwrap();
        WeatherPipeline::new(weather, quotes, None, false)
    }

    #[tokio::test]
    async fn test_build_view_with_fallback_quote() {
        let server = weather_server("Snowy").await;
        let quotes = Arc::new(QuoteService::new(
            Arc::new(DisabledGenerator),
            QuotePolicy::default(),
        ));

        let view = pipeline(&server, Some(quotes)).build_view("Oslo", 1).await.unwrap();

        assert_eq!(view.tomorrow_min_c, Some(-9.0));
        assert_eq!(view.formatted_time, "08:30 AM");
        let quote = view.weather_quote.unwrap();
        assert_eq!(quote.author, "Robert Frost");
        assert_eq!(quote.weather_condition, "Snowy");
    }

    #[tokio::test]
    async fn test_build_view_without_quotes() {
        let server = weather_server("Light snow").await;

        let view = pipeline(&server, None).build_view("Oslo", 0).await.unwrap();

        assert!(view.weather_quote.is_none());
        assert_eq!(view.tomorrow_max_c, Some(-1.0));
    }

    #[tokio::test]
    async fn test_push_without_webhook() {
        let server = weather_server("Light snow").await;

        let err = pipeline(&server, None).push("Oslo", 1).await.unwrap_err();
        assert!(matches!(err, AppError::Webhook(WebhookError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_weather_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = pipeline(&server, None).build_view("Oslo", 1).await.unwrap_err();
        assert_eq!(err.user_message(), "Weather API key is invalid. Check settings.");
    }
}
