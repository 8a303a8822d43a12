//! Weather mood classification.

use std::fmt;

/// Tone of the weather, used to steer quote generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Cheerful,
    Melancholic,
    Romantic,
    Dramatic,
    Serene,
    Mysterious,
    Languid,
    Crisp,
    Energetic,
    Calm,
}

/// Condition keywords in precedence order.
const CONDITION_MOODS: &[(&[&str], Mood)] = &[
    (&["sunny", "clear", "bright"], Mood::Cheerful),
    (&["cloudy", "overcast", "grey"], Mood::Melancholic),
    (&["rain", "drizzle", "shower"], Mood::Romantic),
    (&["storm", "thunder", "lightning"], Mood::Dramatic),
    (&["snow", "blizzard", "winter"], Mood::Serene),
    (&["fog", "mist", "haze"], Mood::Mysterious),
];

impl Mood {
    /// Condition keywords win; otherwise temperature, then wind, then calm.
    pub fn derive(condition_text: &str, temp_c: f64, wind_kph: f64) -> Self {
        let condition = condition_text.to_lowercase();

        if let Some(&(_, mood)) = CONDITION_MOODS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| condition.contains(k)))
        {
            return mood;
        }

        if temp_c > 25.0 {
            Mood::Languid
        } else if temp_c < 5.0 {
            Mood::Crisp
        } else if wind_kph > 20.0 {
            Mood::Energetic
        } else {
            Mood::Calm
        }
    }

    /// Prompt wording for this mood.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Cheerful => "cheerful, bright, optimistic",
            Mood::Melancholic => "melancholic, contemplative, subdued",
            Mood::Romantic => "romantic, nostalgic, peaceful",
            Mood::Dramatic => "dramatic, powerful, intense",
            Mood::Serene => "serene, magical, quiet",
            Mood::Mysterious => "mysterious, ethereal, dreamlike",
            Mood::Languid => "lazy, languid, warm",
            Mood::Crisp => "crisp, invigorating, cold",
            Mood::Energetic => "energetic, restless, dynamic",
            Mood::Calm => "calm, peaceful, gentle",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
