//! Weather-matched literary quotes.
//!
//! Resolves a quote for a location and its current weather through a
//! per-(location, condition) cache, stale reuse, a static fallback table and,
//! last, a text-generation provider. A periodic sweep evicts stale entries
//! a few at a time.

pub mod cache;
pub mod emphasis;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod generator;
pub mod mood;
pub mod parse;
pub mod prompt;
pub mod service;
pub mod types;

pub use cache::QuoteCache;
pub use error::GenerationError;
pub use fallback::FallbackTable;
pub use gemini::GeminiClient;
pub use generator::{DisabledGenerator, QuoteGenerator};
pub use mood::Mood;
pub use service::{QuotePolicy, QuoteService};
pub use types::{CacheKey, CacheStats, Quote};
