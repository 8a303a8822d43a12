use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line summary of all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream weather data settings
    #[serde(default)]
    pub weather: WeatherApiConfig,

    /// Text-generation settings for weather quotes
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Display webhook settings
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Periodic update settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Quote cache policy
    #[serde(default)]
    pub quotes: QuotesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    /// WeatherAPI.com key (required)
    pub api_key: String,
    pub base_url: String,
    /// Location used by scheduled updates and when no location is given
    pub default_location: String,
    pub include_air_quality: bool,
    pub timeout_secs: u64,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "http://api.weatherapi.com/v1".to_string(),
            default_location: "London".to_string(),
            include_air_quality: true,
            timeout_secs: 30,
        }
    }
}

impl WeatherApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 30,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 300,
        }
    }
}

impl GeminiConfig {
    /// Check if a key is configured (not empty or a placeholder)
    pub fn is_configured(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && !key.to_ascii_lowercase().starts_with("your_")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 30,
        }
    }
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Minutes between pushes of the default location
    pub update_interval_minutes: u32,
    /// Minutes between quote cache sweeps
    pub quote_refresh_minutes: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            update_interval_minutes: 30,
            quote_refresh_minutes: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    /// Age below which a cached quote is served without regeneration
    pub freshness_minutes: u32,
    /// Maximum number of stale entries evicted per sweep
    pub sweep_batch: usize,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            freshness_minutes: 120,
            sweep_batch: 3,
        }
    }
}

impl QuotesConfig {
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(u64::from(self.freshness_minutes) * 60)
    }
}

impl Config {
    /// Load configuration from `.env`/`.secrets`, the TOML file and the environment.
    ///
    /// `path` overrides the default location. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_dotenv();

        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => Self::from_file(p)?,
            Some(ref p) => {
                tracing::debug!("No config file at {}, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::NotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WEATHER_API_KEY") {
            self.weather.api_key = v;
        }
        if let Some(v) = lookup("DEFAULT_LOCATION") {
            self.weather.default_location = v;
        }
        if let Some(v) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = v;
        }
        if let Some(v) = lookup("TRMNL_WEBHOOK_URL") {
            self.webhook.url = v;
        }
        if let Some(v) = lookup("UPDATE_INTERVAL_MINUTES") {
            self.scheduler.update_interval_minutes = v.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "UPDATE_INTERVAL_MINUTES must be a whole number of minutes, got {:?}",
                    v
                ))
            })?;
        }
        if let Some(v) = lookup("ENABLE_SCHEDULED_UPDATES") {
            self.scheduler.enabled = v.trim().eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.weather.api_key.trim().is_empty() {
            result.add_error("weather.api_key", "WEATHER_API_KEY is required");
        }
        validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.weather.default_location.trim().is_empty() {
            result.add_error("weather.default_location", "Default location must not be empty");
        }

        if self.gemini.is_configured() {
            validate_url(&self.gemini.base_url, "gemini.base_url", &mut result);
        } else {
            result.add_warning(
                "gemini.api_key",
                "Gemini not configured - quotes will come from cache and fallbacks only",
            );
        }

        if self.webhook.url.trim().is_empty() {
            result.add_warning("webhook.url", "Webhook URL not set - updates will not be pushed");
        } else {
            validate_url(&self.webhook.url, "webhook.url", &mut result);
        }

        if self.scheduler.update_interval_minutes == 0 {
            result.add_warning(
                "scheduler.update_interval_minutes",
                "Scheduled updates disabled (0 minutes)",
            );
        } else if self.scheduler.update_interval_minutes > 1440 {
            result.add_warning(
                "scheduler.update_interval_minutes",
                "Update interval is more than 24 hours",
            );
        }

        if self.quotes.freshness_minutes == 0 {
            result.add_error("quotes.freshness_minutes", "Freshness window must be greater than 0");
        }
        if self.quotes.sweep_batch == 0 {
            result.add_error("quotes.sweep_batch", "Sweep batch must be greater than 0");
        }

        result
    }

    /// Default path of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("trmnl-weather").join("config.toml"))
    }
}

fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env loaded: {}", e);
    }
    if Path::new(".secrets").exists() {
        if let Err(e) = dotenvy::from_filename(".secrets") {
            tracing::warn!("Failed to load .secrets: {}", e);
        }
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
