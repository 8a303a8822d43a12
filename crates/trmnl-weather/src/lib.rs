//! Weather data for the TRMNL plugin
//!
//! Fetches current conditions and forecasts from WeatherAPI.com and
//! narrows the loosely-shaped responses into typed structs once, at the
//! boundary.

pub mod provider;
pub mod types;

pub use provider::WeatherProvider;
pub use types::*;
