//! TRMNL private-plugin webhook.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::instrument;
use trmnl_core::{ReqwestErrorExt, WebhookConfig, WebhookError};

use crate::view::TrmnlView;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    merge_variables: &'a TrmnlView,
}

#[derive(Debug, Clone)]
pub struct TrmnlWebhook {
    client: Arc<Client>,
    url: String,
}

impl TrmnlWebhook {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, WebhookError> {
        if url.trim().is_empty() {
            return Err(WebhookError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WebhookError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            url: url.to_string(),
        })
    }

    pub fn from_config(config: &WebhookConfig) -> Result<Self, WebhookError> {
        Self::new(&config.url, config.timeout())
    }

    /// POST the view as `{"merge_variables": view}`. No retry.
    #[instrument(skip(self, view), fields(location = %view.location_name), level = "info")]
    pub async fn send(&self, view: &TrmnlView) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload {
                merge_variables: view,
            })
            .send()
            .await
            .map_err(|e| WebhookError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("TRMNL webhook error: {} - {}", status, body);
            return Err(WebhookError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Sent weather data to TRMNL webhook: {}", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trmnl_weather::WeatherResponse;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn view() -> TrmnlView {
        let data: WeatherResponse = serde_json::from_value(serde_json::json!({
            "location": { "name": "Oslo" },
            "current": { "temp_c": -2.0, "condition": { "text": "Light snow" } }
        }))
        .unwrap();
        TrmnlView::transform(&data, None)
    }

    #[tokio::test]
    async fn test_send_wraps_merge_variables() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/custom_plugins/abc"))
            .and(body_partial_json(serde_json::json!({
                "merge_variables": { "location_name": "Oslo", "condition_text": "Light snow" }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/api/custom_plugins/abc", mock_server.uri());
        let webhook = TrmnlWebhook::new(&url, Duration::from_secs(5)).unwrap();

        webhook.send(&view()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&mock_server)
            .await;

        let webhook = TrmnlWebhook::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
        let err = webhook.send(&view()).await.unwrap_err();

        assert!(matches!(err, WebhookError::Rejected { status: 429, ref body } if body == "slow down"));
        assert_eq!(err.user_message(), "The display webhook is rate limiting requests.");
    }

    #[test]
    fn test_empty_url_is_not_configured() {
        let result = TrmnlWebhook::from_config(&WebhookConfig::default());
        assert!(matches!(result, Err(WebhookError::NotConfigured)));
    }
}
