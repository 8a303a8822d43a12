//! Prompt sent to the text-generation provider.

use crate::mood::Mood;

/// Build the quote request for a location and its weather.
pub fn build_prompt(location: &str, condition: &str, temp_c: f64, wind_kph: f64) -> String {
    let mood = Mood::derive(condition, temp_c, wind_kph);

    format!(
        r#"
Find a beautiful, poetic quote from classic literature that matches this weather condition:

Location: {location}
Weather: {condition}
Temperature: {temp_c:?}°C
Wind: {wind_kph:?} km/h
Mood: {mood}

Please provide:
1. A quote from classic literature (pre-1950) that captures the essence of this weather
2. The author's name
3. The title of the work
4. A brief explanation of why this quote matches the weather

Format your response as JSON:
{{
    "quote": "the actual quote text",
    "author": "Author Name",
    "work": "Book/Work Title",
    "explanation": "brief explanation of the connection"
}}

Focus on quotes that evoke the feeling, atmosphere, or mood of this specific weather condition. Choose from well-known classic authors like Shakespeare, Dickens, Austen, Bronte, Twain, etc.
"#
    )
}
