use async_trait::async_trait;
use trmnl_weather::WeatherDescriptor;

use crate::error::GenerationError;
use crate::types::Quote;

/// Produces a candidate quote for a location's weather.
///
/// Implementations return the quote text as the provider wrote it;
/// emphasis is applied by the caller.
#[async_trait]
pub trait QuoteGenerator: Send + Sync {
    async fn generate(
        &self,
        location: &str,
        weather: &WeatherDescriptor,
    ) -> Result<Quote, GenerationError>;
}

/// Generator used when no provider key is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl QuoteGenerator for DisabledGenerator {
    async fn generate(
        &self,
        _location: &str,
        _weather: &WeatherDescriptor,
    ) -> Result<Quote, GenerationError> {
        Err(GenerationError::Disabled)
    }
}
