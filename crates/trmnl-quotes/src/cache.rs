//! In-memory quote cache with a freshness window.
//!
//! Each entry holds its quote and insertion time together, so eviction can
//! never leave a quote without a timestamp or the reverse. Entries are only
//! removed by [`QuoteCache::evict_stale`]; a miss never deletes anything.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::{CacheKey, CacheStats, Quote};

#[derive(Debug, Clone)]
struct CacheEntry {
    quote: Quote,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct QuoteCache {
    entries: BTreeMap<CacheKey, CacheEntry>,
    freshness: Duration,
}

impl QuoteCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: BTreeMap::new(),
            freshness,
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `key` if it is younger than the freshness window.
    pub fn get_fresh(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&Quote> {
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| &entry.quote)
    }

    /// Any entry cached for `location`, regardless of age or condition.
    ///
    /// When several conditions are cached the first in key order wins.
    pub fn any_for_location(&self, location: &str) -> Option<&Quote> {
        self.entries
            .iter()
            .find(|(key, _)| key.belongs_to(location))
            .map(|(_, entry)| &entry.quote)
    }

    /// Insert or replace the entry for `key`.
    pub fn insert(&mut self, key: CacheKey, quote: Quote, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            CacheEntry {
                quote,
                updated_at: now,
            },
        );
    }

    /// Keys whose entries are at least as old as the freshness window.
    pub fn stale_keys(&self, now: DateTime<Utc>) -> Vec<CacheKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| !self.is_fresh(entry, now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Remove at most `limit` stale entries and return their keys.
    pub fn evict_stale(&mut self, now: DateTime<Utc>, limit: usize) -> Vec<CacheKey> {
        let evicted: Vec<CacheKey> = self.stale_keys(now).into_iter().take(limit).collect();
        for key in &evicted {
            self.entries.remove(key);
        }
        evicted
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            count: self.entries.len(),
            keys: self.entries.keys().map(|k| k.to_string()).collect(),
            last_update: self
                .entries
                .iter()
                .map(|(k, e)| (k.to_string(), e.updated_at))
                .collect(),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        // Entries stamped in the future count as brand new
        let age = (now - entry.updated_at).to_std().unwrap_or(Duration::ZERO);
        age < self.freshness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const WINDOW: Duration = Duration::from_secs(2 * 60 * 60);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn quote(location: &str, condition: &str) -> Quote {
        Quote {
            text: format!("A {} day in {}", condition, location),
            author: "Anon".to_string(),
            work: "Notes".to_string(),
            weather_condition: condition.to_string(),
            generated_at: t0(),
            location: location.to_string(),
        }
    }

    fn key(location: &str, condition: &str) -> CacheKey {
        CacheKey::new(location, Some(condition))
    }

    #[test]
    fn test_fresh_until_window_elapses() {
        let mut cache = QuoteCache::new(WINDOW);
        cache.insert(key("Paris", "Rainy"), quote("Paris", "Rainy"), t0());

        let just_before = t0() + chrono::Duration::seconds(7199);
        let at_window = t0() + chrono::Duration::seconds(7200);

        assert!(cache.get_fresh(&key("Paris", "Rainy"), just_before).is_some());
        assert!(cache.get_fresh(&key("Paris", "Rainy"), at_window).is_none());
        // A miss does not remove the entry
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let mut cache = QuoteCache::new(WINDOW);
        cache.insert(key("Paris", "Rainy"), quote("Paris", "Rainy"), t0());

        let earlier = t0() - chrono::Duration::minutes(5);
        assert!(cache.get_fresh(&key("Paris", "Rainy"), earlier).is_some());
    }

    #[test]
    fn test_any_for_location_ignores_age_and_condition() {
        let mut cache = QuoteCache::new(WINDOW);
        cache.insert(key("Paris", "Rainy"), quote("Paris", "Rainy"), t0());
        cache.insert(key("London", "Sunny"), quote("London", "Sunny"), t0());

        let found = cache.any_for_location("Paris").unwrap();
        assert_eq!(found.weather_condition, "Rainy");
        assert!(cache.any_for_location("Tokyo").is_none());
    }

    #[test]
    fn test_any_for_location_matches_whole_location() {
        let mut cache = QuoteCache::new(WINDOW);
        cache.insert(key("Paris", "Rainy"), quote("Paris", "Rainy"), t0());
        cache.insert(key("Par", "Sunny"), quote("Par", "Sunny"), t0());

        assert_eq!(
            cache.any_for_location("Par").map(|q| q.location.as_str()),
            Some("Par")
        );
        assert!(cache.any_for_location("Pa").is_none());
        assert!(cache.any_for_location("Paris_Rainy").is_none());
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let mut cache = QuoteCache::new(WINDOW);
        cache.insert(key("Paris", "Rainy"), quote("Paris", "Rainy"), t0());

        let mut newer = quote("Paris", "Rainy");
        newer.text = "replacement".to_string();
        let later = t0() + chrono::Duration::hours(3);
        cache.insert(key("Paris", "Rainy"), newer, later);

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get_fresh(&key("Paris", "Rainy"), later).map(|q| q.text.as_str()),
            Some("replacement")
        );
    }

    #[test]
    fn test_evict_stale_is_bounded() {
        let mut cache = QuoteCache::new(WINDOW);
        for city in ["Berlin", "Lima", "Oslo", "Paris", "Rome"] {
            cache.insert(key(city, "Cloudy"), quote(city, "Cloudy"), t0());
        }

        let later = t0() + chrono::Duration::hours(3);
        assert_eq!(cache.stale_keys(later).len(), 5);

        assert_eq!(cache.evict_stale(later, 3).len(), 3);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.evict_stale(later, 3).len(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evict_stale_keeps_fresh_entries() {
        let mut cache = QuoteCache::new(WINDOW);
        cache.insert(key("Paris", "Rainy"), quote("Paris", "Rainy"), t0());
        let later = t0() + chrono::Duration::hours(2);
        cache.insert(key("Rome", "Sunny"), quote("Rome", "Sunny"), later);

        let evicted = cache.evict_stale(later, 3);
        assert_eq!(evicted, vec![key("Paris", "Rainy")]);
        assert!(cache.get_fresh(&key("Rome", "Sunny"), later).is_some());
    }

    #[test]
    fn test_stats_snapshot() {
        let mut cache = QuoteCache::new(WINDOW);
        cache.insert(key("Paris", "Rainy"), quote("Paris", "Rainy"), t0());
        cache.insert(key("Oslo", "Snow"), quote("Oslo", "Snow"), t0());

        let stats = cache.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.keys, vec!["Oslo_Snow".to_string(), "Paris_Rainy".to_string()]);
        assert_eq!(stats.last_update.get("Paris_Rainy"), Some(&t0()));
    }
}
