use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trmnl_weather::WeatherDescriptor;

/// Markup wrapped around emphasized words.
pub const EMPHASIS_OPEN: &str = "<strong>";
pub const EMPHASIS_CLOSE: &str = "</strong>";

/// Condition used in cache and fallback keys when none was supplied.
pub const UNKNOWN_CONDITION: &str = "unknown";

/// Condition used in prompts and on generated quotes when none was supplied.
pub const UNKNOWN_WEATHER: &str = "unknown weather";

/// A quote produced by generation or taken from the fallback table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Quote text, possibly containing emphasis markup
    pub text: String,
    pub author: String,
    pub work: String,
    /// Condition text the quote was produced for
    pub weather_condition: String,
    pub generated_at: DateTime<Utc>,
    /// "Default" for fallback quotes
    pub location: String,
}

#[cfg(test)]
impl Quote {
    /// Quote text with emphasis markup removed.
    pub(crate) fn plain_text(&self) -> String {
        self.text.replace(EMPHASIS_OPEN, "").replace(EMPHASIS_CLOSE, "")
    }
}

/// Cache key: `"{location}_{condition}"`.
///
/// Temperature and wind are not part of the key, so two requests for the
/// same location and condition text share an entry. Stale reuse finds
/// entries by the `"{location}_"` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub const SEPARATOR: char = '_';

    pub fn new(location: &str, condition_text: Option<&str>) -> Self {
        Self(format!(
            "{}{}{}",
            location,
            Self::SEPARATOR,
            condition_text.unwrap_or(UNKNOWN_CONDITION)
        ))
    }

    pub fn for_weather(location: &str, weather: &WeatherDescriptor) -> Self {
        Self::new(location, weather.condition_text.as_deref())
    }

    /// Prefix shared by every key cached for `location`.
    fn location_prefix(location: &str) -> String {
        format!("{}{}", location, Self::SEPARATOR)
    }

    pub fn belongs_to(&self, location: &str) -> bool {
        self.0.starts_with(&Self::location_prefix(location))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only snapshot of the quote cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub count: usize,
    pub keys: Vec<String>,
    pub last_update: BTreeMap<String, DateTime<Utc>>,
}
