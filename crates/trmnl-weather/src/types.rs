use serde::{Deserialize, Serialize};

/// Response body of `current.json` and `forecast.json`.
///
/// Every field is optional upstream; missing values deserialize to `None`
/// or an empty default instead of failing the whole response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherResponse {
    pub location: ApiLocation,
    pub current: ApiCurrent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ApiForecast>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiLocation {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub tz_id: Option<String>,
    /// Local wall-clock time, e.g. `2024-05-01 14:05`
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCurrent {
    pub last_updated_epoch: Option<i64>,
    /// Local time of the observation, e.g. `2024-05-01 14:00`
    pub last_updated: Option<String>,
    pub temp_c: Option<f64>,
    pub feelslike_c: Option<f64>,
    pub windchill_c: Option<f64>,
    pub wind_kph: Option<f64>,
    pub wind_dir: Option<String>,
    pub humidity: Option<f64>,
    pub uv: Option<f64>,
    pub condition: Option<ApiCondition>,
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCondition {
    pub text: Option<String>,
    pub icon: Option<String>,
    pub code: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQuality {
    /// US EPA index, 1 (good) to 6 (hazardous)
    #[serde(rename = "us-epa-index")]
    pub us_epa_index: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiForecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastDay {
    pub date: Option<String>,
    pub day: DaySummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaySummary {
    pub maxtemp_c: Option<f64>,
    pub mintemp_c: Option<f64>,
    pub daily_chance_of_rain: Option<f64>,
    pub condition: Option<ApiCondition>,
}

impl WeatherResponse {
    pub fn location_name(&self) -> &str {
        self.location.name.as_deref().unwrap_or("Unknown")
    }

    /// Current condition text, empty when the provider omitted it.
    pub fn condition_text(&self) -> &str {
        self.current
            .condition
            .as_ref()
            .and_then(|c| c.text.as_deref())
            .unwrap_or("")
    }

    /// Summary of the first forecast day, if a forecast was requested.
    pub fn first_forecast_day(&self) -> Option<&DaySummary> {
        self.forecast
            .as_ref()
            .and_then(|f| f.forecastday.first())
            .map(|d| &d.day)
    }

    /// Narrow the response to the attributes quote lookup works with.
    pub fn descriptor(&self) -> WeatherDescriptor {
        WeatherDescriptor {
            condition_text: Some(self.condition_text().to_string()),
            temp_c: self.current.temp_c.unwrap_or(0.0),
            wind_kph: self.current.wind_kph.unwrap_or(0.0),
        }
    }
}

/// The weather attributes a quote is chosen and emphasized for.
///
/// `condition_text` is `None` only when the caller had no condition at all;
/// an empty string is a present-but-blank condition and is keyed as such.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherDescriptor {
    pub condition_text: Option<String>,
    pub temp_c: f64,
    pub wind_kph: f64,
}

impl WeatherDescriptor {
    pub fn new(condition_text: impl Into<String>, temp_c: f64, wind_kph: f64) -> Self {
        Self {
            condition_text: Some(condition_text.into()),
            temp_c,
            wind_kph,
        }
    }

    /// Condition text, or `default` when absent.
    pub fn condition_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.condition_text.as_deref().unwrap_or(default)
    }
}
