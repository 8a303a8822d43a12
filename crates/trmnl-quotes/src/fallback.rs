//! Pre-authored quotes served when nothing is cached for a location.
//!
//! Lookup lowercases the full condition text and matches it against the
//! category names exactly, so "Sunny" hits `sunny` but "Partly sunny" does
//! not. Fallback quotes are never written into the cache.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::Quote;

const FALLBACK_LOCATION: &str = "Default";

/// (category, text, author, work, condition label)
const FALLBACK_QUOTES: [(&str, &str, &str, &str, &str); 5] = [
    (
        "sunny",
        "The <strong>sun</strong> was <strong>shining</strong> on the sea, <strong>shining</strong> with all his might.",
        "Lewis Carroll",
        "The Walrus and the Carpenter",
        "Sunny",
    ),
    (
        "cloudy",
        "The <strong>sky</strong> was <strong>overcast</strong>, and the <strong>clouds</strong> hung low and heavy.",
        "Charles Dickens",
        "Great Expectations",
        "Cloudy",
    ),
    (
        "rainy",
        "The <strong>rain</strong> to the <strong>wind</strong> said, 'You push and I'll pelt.'",
        "Robert Frost",
        "A Line Storm Song",
        "Rainy",
    ),
    (
        "stormy",
        "The <strong>wind</strong>, which had been threatening all day, began to <strong>blow</strong> with a fury that seemed to shake the very foundations of the house.",
        "Charlotte Brontë",
        "Jane Eyre",
        "Stormy",
    ),
    (
        "snowy",
        "The <strong>snow</strong> was falling, falling, falling, and the world was <strong>white</strong>.",
        "Robert Frost",
        "Stopping by Woods on a Snowy Evening",
        "Snowy",
    ),
];

#[derive(Debug, Clone)]
pub struct FallbackTable {
    quotes: HashMap<&'static str, Quote>,
}

impl FallbackTable {
    /// Build the table, stamping every quote with the current time.
    pub fn new() -> Self {
        Self::built_at(Utc::now())
    }

    pub fn built_at(created_at: DateTime<Utc>) -> Self {
        let quotes = FALLBACK_QUOTES
            .iter()
            .map(|&(category, text, author, work, condition)| {
                (
                    category,
                    Quote {
                        text: text.to_string(),
                        author: author.to_string(),
                        work: work.to_string(),
                        weather_condition: condition.to_string(),
                        generated_at: created_at,
                        location: FALLBACK_LOCATION.to_string(),
                    },
                )
            })
            .collect();

        Self { quotes }
    }

    /// Quote for a condition whose lowercased text is a category name.
    pub fn get(&self, condition_text: &str) -> Option<&Quote> {
        self.quotes.get(condition_text.to_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::new()
    }
}
