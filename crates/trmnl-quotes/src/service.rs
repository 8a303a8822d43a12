//! Quote resolution and the periodic refresh sweep.
//!
//! Resolution order for `(location, weather)`:
//!
//! 1. a fresh entry under the exact key;
//! 2. any entry cached for the location, whatever its age or condition;
//! 3. the fallback table, by lowercased condition text (never cached);
//! 4. generation, written through to the cache with emphasis applied. On
//!    failure the location scan is retried once before giving up.
//!
//! An expired entry under the exact key is still found by step 2, so a key
//! only regenerates after a sweep has evicted it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use trmnl_core::{GeminiConfig, QuotesConfig};
use trmnl_weather::WeatherDescriptor;

use crate::cache::QuoteCache;
use crate::emphasis::emphasize_for_weather;
use crate::error::GenerationError;
use crate::fallback::FallbackTable;
use crate::generator::QuoteGenerator;
use crate::types::{CacheKey, CacheStats, Quote, UNKNOWN_CONDITION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePolicy {
    /// Entries younger than this are served without regeneration
    pub freshness: Duration,
    /// Maximum stale entries evicted per sweep
    pub sweep_batch: usize,
    pub generation_timeout: Duration,
}

impl Default for QuotePolicy {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(2 * 60 * 60),
            sweep_batch: 3,
            generation_timeout: Duration::from_secs(30),
        }
    }
}

impl QuotePolicy {
    pub fn from_config(quotes: &QuotesConfig, gemini: &GeminiConfig) -> Self {
        Self {
            freshness: quotes.freshness(),
            sweep_batch: quotes.sweep_batch,
            generation_timeout: gemini.timeout(),
        }
    }
}

pub struct QuoteService {
    cache: Mutex<QuoteCache>,
    fallbacks: FallbackTable,
    generator: Arc<dyn QuoteGenerator>,
    policy: QuotePolicy,
}

impl QuoteService {
    pub fn new(generator: Arc<dyn QuoteGenerator>, policy: QuotePolicy) -> Self {
        Self {
            cache: Mutex::new(QuoteCache::new(policy.freshness)),
            fallbacks: FallbackTable::new(),
            generator,
            policy,
        }
    }

    /// Resolve a quote for `location`. `None` means no quote is available.
    pub async fn lookup_quote(&self, location: &str, weather: &WeatherDescriptor) -> Option<Quote> {
        self.lookup_quote_at(location, weather, Utc::now()).await
    }

    /// [`lookup_quote`](Self::lookup_quote) evaluated at `now`. A generated
    /// quote is cached with `now` as its insertion time.
    pub async fn lookup_quote_at(
        &self,
        location: &str,
        weather: &WeatherDescriptor,
        now: DateTime<Utc>,
    ) -> Option<Quote> {
        let key = CacheKey::for_weather(location, weather);

        {
            let cache = self.cache.lock();

            if let Some(quote) = cache.get_fresh(&key, now) {
                tracing::debug!("Fresh cached quote for {}", key);
                return Some(quote.clone());
            }

            if let Some(quote) = cache.any_for_location(location) {
                tracing::info!(
                    "Reusing cached quote for {} ({}) instead of generating",
                    location,
                    quote.weather_condition
                );
                return Some(quote.clone());
            }
        }

        let condition = weather.condition_or(UNKNOWN_CONDITION);
        if let Some(quote) = self.fallbacks.get(condition) {
            tracing::info!("Using fallback quote for condition '{}'", condition);
            return Some(quote.clone());
        }

        match self.generate(location, weather).await {
            Ok(mut quote) => {
                quote.text = emphasize_for_weather(&quote.text, weather);
                tracing::info!("Generated quote for {} by {}", key, quote.author);
                self.cache.lock().insert(key, quote.clone(), now);
                Some(quote)
            }
            Err(e) => {
                match &e {
                    GenerationError::Disabled => {
                        tracing::debug!("Quote generation disabled for {}", key)
                    }
                    e if e.is_provider_failure() => {
                        tracing::warn!("Quote provider failed for {}: {}", key, e)
                    }
                    e => tracing::error!("Unusable quote reply for {}: {}", key, e),
                }

                let recovered = self.cache.lock().any_for_location(location).cloned();
                if recovered.is_none() {
                    tracing::info!("No quote available for {}", location);
                }
                recovered
            }
        }
    }

    async fn generate(
        &self,
        location: &str,
        weather: &WeatherDescriptor,
    ) -> Result<Quote, GenerationError> {
        let timeout = self.policy.generation_timeout;
        tokio::time::timeout(timeout, self.generator.generate(location, weather))
            .await
            .map_err(|_| GenerationError::Timeout(timeout))?
    }

    /// Evict up to one batch of stale entries. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut cache = self.cache.lock();
        let stale = cache.stale_keys(now).len();
        if stale == 0 {
            tracing::debug!("Quote sweep: nothing stale");
            return 0;
        }

        let evicted = cache.evict_stale(now, self.policy.sweep_batch);
        tracing::info!(
            "Quote sweep: {} stale, evicted {} ({} remaining)",
            stale,
            evicted.len(),
            stale - evicted.len()
        );
        evicted.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }
}
