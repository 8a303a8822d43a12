//! Flat view model rendered by the TRMNL plugin template.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use trmnl_quotes::Quote;
use trmnl_weather::WeatherResponse;

/// Shown when the observation time is missing or unreadable.
pub const MISSING_TIME: &str = "—";

/// Format of WeatherAPI's local `last_updated` field.
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteView {
    pub quote: String,
    pub author: String,
    pub work: String,
    pub weather_condition: String,
}

impl From<Quote> for QuoteView {
    fn from(quote: Quote) -> Self {
        Self {
            quote: quote.text,
            author: quote.author,
            work: quote.work,
            weather_condition: quote.weather_condition,
        }
    }
}

/// Merge variables pushed to the display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrmnlView {
    pub location_name: String,
    pub location_region: String,
    pub timezone: String,

    pub temp_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub condition_text: String,

    pub wind_kph: Option<f64>,
    pub wind_dir: String,
    pub windchill_c: Option<f64>,

    /// From the first forecast day, when a forecast was fetched
    pub tomorrow_max_c: Option<f64>,
    pub tomorrow_min_c: Option<f64>,

    pub uv_index: f64,
    pub uv_status: String,
    /// US EPA index, 0 when air quality was not requested
    pub aqi_us: u8,
    pub aqi_status: String,

    pub formatted_time: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_quote: Option<QuoteView>,
}

impl TrmnlView {
    pub fn transform(response: &WeatherResponse, quote: Option<Quote>) -> Self {
        let location = &response.location;
        let current = &response.current;
        let tomorrow = response.first_forecast_day();

        let uv_index = current.uv.unwrap_or(0.0);
        let aqi_us = current
            .air_quality
            .as_ref()
            .and_then(|aq| aq.us_epa_index)
            .unwrap_or(0);

        Self {
            location_name: response.location_name().to_string(),
            location_region: location.region.clone().unwrap_or_default(),
            timezone: location.tz_id.clone().unwrap_or_default(),
            temp_c: current.temp_c,
            feels_like_c: current.feelslike_c,
            condition_text: response.condition_text().to_string(),
            wind_kph: current.wind_kph,
            wind_dir: current.wind_dir.clone().unwrap_or_default(),
            windchill_c: current.windchill_c,
            tomorrow_max_c: tomorrow.and_then(|d| d.maxtemp_c),
            tomorrow_min_c: tomorrow.and_then(|d| d.mintemp_c),
            uv_index,
            uv_status: uv_status(uv_index).to_string(),
            aqi_us,
            aqi_status: aqi_status(aqi_us).to_string(),
            formatted_time: format_timestamp(current.last_updated.as_deref()),
            weather_quote: quote.map(QuoteView::from),
        }
    }
}

pub fn aqi_status(aqi: u8) -> &'static str {
    match aqi {
        0..=1 => "Good",
        2 => "Moderate",
        3 => "Unhealthy for Sensitive Groups",
        4 => "Unhealthy",
        5 => "Very Unhealthy",
        _ => "Hazardous",
    }
}

pub fn uv_status(uv: f64) -> &'static str {
    if uv <= 2.0 {
        "Low"
    } else if uv <= 5.0 {
        "Moderate"
    } else if uv <= 7.0 {
        "High"
    } else if uv <= 10.0 {
        "Very High"
    } else {
        "Extreme"
    }
}

/// 12-hour clock time of a provider local timestamp, e.g. `02:00 PM`.
pub fn format_timestamp(local: Option<&str>) -> String {
    local
        .and_then(|s| NaiveDateTime::parse_from_str(s, LOCAL_TIME_FORMAT).ok())
        .map(|dt| dt.format("%I:%M %p").to_string())
        .unwrap_or_else(|| MISSING_TIME.to_string())
}
