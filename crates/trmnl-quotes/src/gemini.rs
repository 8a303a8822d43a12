//! Gemini `generateContent` client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use trmnl_core::{GeminiConfig, ReqwestErrorExt};
use trmnl_weather::WeatherDescriptor;

use crate::error::GenerationError;
use crate::generator::QuoteGenerator;
use crate::parse::parse_quote_payload;
use crate::prompt::build_prompt;
use crate::types::{Quote, UNKNOWN_WEATHER};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, GenerationError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyResponse("no candidates"))?;
        let part = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .ok_or(GenerationError::EmptyResponse("no content parts"))?;
        part.text.ok_or(GenerationError::EmptyResponse("no text"))
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerationError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Send a prompt and return the first candidate's text.
    #[instrument(skip(self, prompt), level = "debug")]
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "topK": self.top_k,
                "topP": self.top_p,
                "maxOutputTokens": self.max_output_tokens,
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.into_network_error()))?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        parsed.into_text()
    }
}

#[async_trait]
impl QuoteGenerator for GeminiClient {
    #[instrument(skip(self), level = "info")]
    async fn generate(
        &self,
        location: &str,
        weather: &WeatherDescriptor,
    ) -> Result<Quote, GenerationError> {
        let condition = weather.condition_or(UNKNOWN_WEATHER);
        let prompt = build_prompt(location, condition, weather.temp_c, weather.wind_kph);

        let text = self.generate_text(&prompt).await?;
        tracing::debug!("Gemini replied with {} chars", text.len());

        let payload = parse_quote_payload(&text)?;

        Ok(Quote {
            text: payload.quote,
            author: payload.author,
            work: payload.work,
            weather_condition: condition.to_string(),
            generated_at: Utc::now(),
            location: location.to_string(),
        })
    }
}
