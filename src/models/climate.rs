//! Normalized daily climate data produced by the weather backends

use serde::{Deserialize, Serialize};

/// Canonical weather condition shared by every backend
///
/// Each backend maps its own weather codes or indices into this enum via a
/// fixed lookup, so the rule engine never sees backend-specific codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Fog,
    Rain,
    Snow,
    Windy,
    Other,
}

impl WeatherCondition {
    /// Parse a canonical condition name as it appears in rule values
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Clear" => Some(WeatherCondition::Clear),
            "Cloudy" => Some(WeatherCondition::Cloudy),
            "Fog" => Some(WeatherCondition::Fog),
            "Rain" => Some(WeatherCondition::Rain),
            "Snow" => Some(WeatherCondition::Snow),
            "Windy" => Some(WeatherCondition::Windy),
            "Other" => Some(WeatherCondition::Other),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Fog => "Fog",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Windy => "Windy",
            WeatherCondition::Other => "Other",
        }
    }
}

/// One day of climate data, normalized across backends
///
/// Immutable once constructed: the provider adapter builds it, the rule
/// engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateRecord {
    /// Mean of the day's maximum and minimum temperature in °C
    pub temperature: f64,
    /// Mean relative humidity in %
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind: f64,
    /// UV index
    pub uv_index: f64,
    /// Canonical condition for the day
    pub condition: WeatherCondition,
    /// Daily precipitation in mm; `None` when the backend does not report it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
}
