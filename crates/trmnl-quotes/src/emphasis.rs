//! Emphasis of weather words in quote text.
//!
//! The word set is chosen from the current temperature, wind and sky, then
//! every whole-word, case-insensitive match is wrapped in `<strong>` with its
//! original casing kept. Running this twice wraps matches twice, so it must be
//! applied exactly once to each freshly generated quote.

use regex::Regex;
use trmnl_weather::WeatherDescriptor;

use crate::types::{EMPHASIS_CLOSE, EMPHASIS_OPEN, UNKNOWN_WEATHER};

const COLD_WORDS: &[&str] = &["cold", "cool", "chill", "chilly", "freezing", "frost", "ice", "winter"];
const HOT_WORDS: &[&str] = &["hot", "warm", "heat", "summer", "swelter", "burn", "scorch"];
const MILD_WORDS: &[&str] = &["mild", "temperate", "pleasant", "gentle", "soft"];

const WINDY_WORDS: &[&str] = &["wind", "breeze", "gust", "blow", "blowing", "air", "gale", "storm"];
const CALM_WORDS: &[&str] = &["calm", "still", "quiet", "peaceful", "serene"];

const SUNNY_WORDS: &[&str] = &["sun", "sunny", "bright", "light", "shine", "shining", "golden", "radiant"];
const CLOUDY_WORDS: &[&str] = &["cloud", "cloudy", "overcast", "grey", "gray", "dull", "dim", "shadow"];
const RAINY_WORDS: &[&str] = &["rain", "rainy", "drizzle", "shower", "wet", "damp", "moist", "drops"];
const STORMY_WORDS: &[&str] = &["storm", "stormy", "thunder", "lightning", "tempest", "fury", "rage"];
const FOGGY_WORDS: &[&str] = &["fog", "foggy", "mist", "haze", "veil", "shroud", "obscure"];
const SNOWY_WORDS: &[&str] = &["snow", "snowy", "white", "blanket", "crystal", "pure", "clean"];

const GENERIC_WORDS: &[&str] = &["weather", "sky", "heaven", "heavens", "atmosphere", "air"];

/// Sky categories in match order: (condition keywords, words to emphasize).
const SKY_CATEGORIES: &[(&[&str], &[&str])] = &[
    (&["sunny", "clear"], SUNNY_WORDS),
    (&["cloudy", "overcast"], CLOUDY_WORDS),
    (&["rain"], RAINY_WORDS),
    (&["storm", "thunder"], STORMY_WORDS),
    (&["fog", "mist"], FOGGY_WORDS),
    (&["snow"], SNOWY_WORDS),
];

const COLD_BELOW_C: f64 = 10.0;
const HOT_ABOVE_C: f64 = 25.0;
const WINDY_ABOVE_KPH: f64 = 15.0;

fn temperature_words(temp_c: f64) -> &'static [&'static str] {
    if temp_c < COLD_BELOW_C {
        COLD_WORDS
    } else if temp_c > HOT_ABOVE_C {
        HOT_WORDS
    } else {
        MILD_WORDS
    }
}

fn wind_words(wind_kph: f64) -> &'static [&'static str] {
    if wind_kph > WINDY_ABOVE_KPH {
        WINDY_WORDS
    } else {
        CALM_WORDS
    }
}

/// First sky category whose keyword occurs in the condition text.
fn sky_words(condition_text: &str) -> &'static [&'static str] {
    let condition = condition_text.to_lowercase();
    SKY_CATEGORIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| condition.contains(k)))
        .map(|&(_, words)| words)
        .unwrap_or(&[])
}

/// Every word worth emphasizing for these conditions.
pub fn weather_words(condition_text: &str, temp_c: f64, wind_kph: f64) -> Vec<&'static str> {
    let mut words = Vec::new();
    words.extend_from_slice(temperature_words(temp_c));
    words.extend_from_slice(wind_words(wind_kph));
    words.extend_from_slice(sky_words(condition_text));
    words.extend_from_slice(GENERIC_WORDS);
    words
}

/// Wrap each whole-word, case-insensitive occurrence of `words` in `text`.
pub fn emphasize(text: &str, words: &[&str]) -> String {
    if words.is_empty() || text.is_empty() {
        return text.to_string();
    }

    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)\b({})\b", alternation);

    match Regex::new(&pattern) {
        Ok(re) => re
            .replace_all(text, format!("{}${{1}}{}", EMPHASIS_OPEN, EMPHASIS_CLOSE).as_str())
            .into_owned(),
        Err(e) => {
            tracing::warn!("Emphasis pattern failed to compile: {}", e);
            text.to_string()
        }
    }
}

/// Emphasize the words matching `weather` in a freshly generated quote.
pub fn emphasize_for_weather(text: &str, weather: &WeatherDescriptor) -> String {
    let words = weather_words(
        weather.condition_or(UNKNOWN_WEATHER),
        weather.temp_c,
        weather.wind_kph,
    );
    emphasize(text, &words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cold_windy_stormy_words() {
        let weather = WeatherDescriptor::new("Stormy", 2.0, 25.0);
        let out = emphasize_for_weather("The wind howled across the plain", &weather);
        assert_eq!(out, "The <strong>wind</strong> howled across the plain");

        let out = emphasize_for_weather("A cold wind, and thunder rolling", &weather);
        assert_eq!(
            out,
            "A <strong>cold</strong> <strong>wind</strong>, and <strong>thunder</strong> rolling"
        );
    }

    #[test]
    fn test_unrelated_categories_are_not_emphasized() {
        // Warm, calm and sunny: cold and rain words stay plain
        let weather = WeatherDescriptor::new("Sunny", 28.0, 4.0);
        let out = emphasize_for_weather("Cold rain gave way to warm sun", &weather);
        assert_eq!(
            out,
            "Cold rain gave way to <strong>warm</strong> <strong>sun</strong>"
        );
    }

    #[test]
    fn test_preserves_original_casing() {
        let weather = WeatherDescriptor::new("Clear", 18.0, 5.0);
        let out = emphasize_for_weather("Bright SKY and Gentle airs", &weather);
        assert_eq!(
            out,
            "<strong>Bright</strong> <strong>SKY</strong> and <strong>Gentle</strong> airs"
        );
    }

    #[test]
    fn test_whole_words_only() {
        let weather = WeatherDescriptor::new("Light rain", 12.0, 5.0);
        // "rainbow" and "drainage" contain "rain" but are not whole-word matches
        let out = emphasize_for_weather("A rainbow over the drainage, then rain", &weather);
        assert_eq!(out, "A rainbow over the drainage, then <strong>rain</strong>");
    }

    #[test]
    fn test_first_sky_category_wins() {
        // "Sunny" is checked before "storm", so storm words are not added
        let words = weather_words("Sunny with thunderstorms", 15.0, 5.0);
        assert!(words.contains(&"sun"));
        assert!(!words.contains(&"thunder"));
    }

    #[test]
    fn test_unknown_condition_has_no_sky_words() {
        let words = weather_words("Volcanic ash", 15.0, 5.0);
        assert!(words.contains(&"mild"));
        assert!(words.contains(&"calm"));
        assert!(words.contains(&"weather"));
        assert_eq!(words.len(), MILD_WORDS.len() + CALM_WORDS.len() + GENERIC_WORDS.len());
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(temperature_words(10.0), MILD_WORDS);
        assert_eq!(temperature_words(9.9), COLD_WORDS);
        assert_eq!(temperature_words(25.0), MILD_WORDS);
        assert_eq!(temperature_words(25.1), HOT_WORDS);
        assert_eq!(wind_words(15.0), CALM_WORDS);
        assert_eq!(wind_words(15.1), WINDY_WORDS);
    }

    #[test]
    fn test_not_idempotent() {
        let weather = WeatherDescriptor::new("Snow", -5.0, 2.0);
        let once = emphasize_for_weather("snow", &weather);
        let twice = emphasize_for_weather(&once, &weather);
        assert_eq!(once, "<strong>snow</strong>");
        assert_eq!(twice, "<strong><strong>snow</strong></strong>");
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(emphasize("", &["sun"]), "");
        assert_eq!(emphasize("sun", &[]), "sun");
    }
}
