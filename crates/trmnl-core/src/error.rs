//! Error types shared by the plugin crates.
//!
//! Each boundary (weather API, webhook, configuration) has its own enum;
//! the pipeline lifts them into [`AppError`]. `user_message()` gives the
//! one-line text printed by the CLI.

use thiserror::Error;

/// Top-level application error type.
///
/// Every fallible pipeline step converts into this type.
/// Use `user_message()` to get a short operator-facing message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),
}

impl AppError {
    /// Returns a short message suitable for CLI output.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Webhook(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Unable to connect. Check the network.",
            NetworkError::Timeout => "The request timed out.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The upstream server is experiencing issues."
            }
            NetworkError::ServerError { .. } => "The request failed.",
            NetworkError::InvalidResponse(_) => "Received an unexpected response.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed.",
        }
    }
}

/// Weather data provider errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Weather API error: {0}")]
    ApiError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound(_) => "Location not found. Check and try again.",
            WeatherError::ApiError(_) => "Weather service error.",
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::Network(e) => e.user_message(),
            WeatherError::Parse(_) => "Weather data could not be read.",
        }
    }
}

/// Webhook delivery errors.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Webhook rejected payload: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Webhook URL not configured")]
    NotConfigured,
}

impl WebhookError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WebhookError::Rejected { status, .. } if *status == 429 => {
                "The display webhook is rate limiting requests."
            }
            WebhookError::Rejected { .. } => "The display webhook rejected the update.",
            WebhookError::Network(e) => e.user_message(),
            WebhookError::NotConfigured => "No webhook URL configured.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
