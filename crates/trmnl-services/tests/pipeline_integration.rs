//! End-to-end pipeline against mocked weather, Gemini and webhook servers.

use std::sync::Arc;

use serde_json::json;
use trmnl_core::{Config, GeminiConfig};
use trmnl_quotes::{GeminiClient, QuotePolicy, QuoteService};
use trmnl_services::WeatherPipeline;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Servers {
    weather: MockServer,
    gemini: MockServer,
    webhook: MockServer,
}

impl Servers {
    async fn start() -> Self {
        Self {
            weather: MockServer::start().await,
            gemini: MockServer::start().await,
            webhook: MockServer::start().await,
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        config.weather.api_key = "weather_key".to_string();
        config.weather.base_url = self.weather.uri();
        config.weather.include_air_quality = true;
        config.gemini = GeminiConfig {
            api_key: "gemini_key".to_string(),
            base_url: self.gemini.uri(),
            timeout_secs: 5,
            ..GeminiConfig::default()
        };
        config.webhook.url = format!("{}/api/custom_plugins/uuid", self.webhook.uri());
        config
    }
}

async fn mount_weather(server: &MockServer, location: &str, condition: &str) {
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", location))
        .and(query_param("aqi", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": { "name": location, "region": "", "tz_id": "Asia/Tokyo" },
            "current": {
                "last_updated": "2024-05-01 18:15",
                "temp_c": 18.0,
                "feelslike_c": 17.5,
                "wind_kph": 5.0,
                "wind_dir": "E",
                "uv": 6.0,
                "condition": { "text": condition },
                "air_quality": { "us-epa-index": 3 }
            },
            "forecast": { "forecastday": [ { "day": { "maxtemp_c": 22.0, "mintemp_c": 13.0 } } ] }
        })))
        .mount(server)
        .await;
}

fn pipeline(config: &Config) -> WeatherPipeline {
    let generator = Arc::new(GeminiClient::from_config(&config.gemini).unwrap());
    let quotes = Arc::new(QuoteService::new(
        generator,
        QuotePolicy::from_config(&config.quotes, &config.gemini),
    ));
    WeatherPipeline::from_config(config, Some(quotes)).unwrap()
}

#[tokio::test]
async fn test_generated_quote_is_emphasized_cached_and_pushed() {
    let servers = Servers::start().await;
    mount_weather(&servers.weather, "Tokyo", "Clear").await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{
                "text": "```json\n{\"quote\": \"The sky was clear and the air was mild\", \"author\": \"Jane Austen\", \"work\": \"Emma\"}\n```"
            }] } }]
        })))
        .expect(1)
        .mount(&servers.gemini)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/custom_plugins/uuid"))
        .and(body_partial_json(json!({
            "merge_variables": {
                "location_name": "Tokyo",
                "aqi_status": "Unhealthy for Sensitive Groups",
                "uv_status": "High",
                "formatted_time": "06:15 PM",
                "weather_quote": {
                    "quote": "The <strong>sky</strong> was clear and the <strong>air</strong> was <strong>mild</strong>",
                    "author": "Jane Austen",
                    "work": "Emma",
                    "weather_condition": "Clear"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&servers.webhook)
        .await;

    let config = servers.config();
    let pipeline = pipeline(&config);

    let first = pipeline.push("Tokyo", 1).await.unwrap();
    let second = pipeline.push("Tokyo", 1).await.unwrap();
    assert_eq!(first.weather_quote, second.weather_quote);

    let stats = pipeline.quotes().unwrap().stats();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.keys, vec!["Tokyo_Clear".to_string()]);
}

#[tokio::test]
async fn test_provider_failure_degrades_to_no_quote() {
    let servers = Servers::start().await;
    mount_weather(&servers.weather, "Dublin", "Patchy rain nearby").await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&servers.gemini)
        .await;

    let config = servers.config();
    let view = pipeline(&config).build_view("Dublin", 1).await.unwrap();

    assert_eq!(view.location_name, "Dublin");
    assert_eq!(view.condition_text, "Patchy rain nearby");
    assert!(view.weather_quote.is_none());
}

#[tokio::test]
async fn test_fallback_condition_never_reaches_provider() {
    let servers = Servers::start().await;
    mount_weather(&servers.weather, "Madrid", "Sunny").await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servers.gemini)
        .await;

    let config = servers.config();
    let pipeline = pipeline(&config);
    let view = pipeline.build_view("Madrid", 1).await.unwrap();

    let quote = view.weather_quote.unwrap();
    assert_eq!(quote.author, "Lewis Carroll");
    assert_eq!(pipeline.quotes().unwrap().stats().count, 0);
}
