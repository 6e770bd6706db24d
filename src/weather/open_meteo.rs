//! Open-Meteo forecast backend, the fallback climate data source.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use super::ClimateProvider;
use crate::error::ClimaCertoError;
use crate::models::{ClimateRecord, Coordinates, WeatherCondition};

pub struct OpenMeteoProvider {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OpenMeteoProvider {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl ClimateProvider for OpenMeteoProvider {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    async fn fetch(&self, coords: Coordinates, date: NaiveDate) -> crate::Result<ClimateRecord> {
        let day = date.format("%Y-%m-%d").to_string();
        let url = format!(
            "{}?latitude={}&longitude={}&start_date={}&end_date={}&daily=weather_code,temperature_2m_max,temperature_2m_min,relative_humidity_2m_mean,wind_speed_10m_max,uv_index_max&timezone=auto&wind_speed_unit=ms",
            self.base_url, coords.latitude, coords.longitude, day, day
        );

        let response = self.client.get(url).send().await.map_err(|err| {
            tracing::debug!(error = %err, "Open-Meteo request failed");
            ClimaCertoError::upstream_unavailable("Open-Meteo API unavailable.")
        })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Open-Meteo returned an error status");
            return Err(ClimaCertoError::upstream_unavailable(
                "Open-Meteo API unavailable.",
            ));
        }

        let payload: OpenMeteoResponse = response.json().await.map_err(|err| {
            tracing::debug!(error = %err, "Open-Meteo payload did not parse");
            ClimaCertoError::upstream_malformed("Invalid response from Open-Meteo.")
        })?;

        record_from_payload(payload)
    }
}

/// Daily forecast response from Open-Meteo.
///
/// Every series is an array with one slot per requested day; slots may be
/// null when the model has no value for that day.
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    weather_code: Option<Vec<Option<u16>>>,
    temperature_2m_max: Option<Vec<Option<f64>>>,
    temperature_2m_min: Option<Vec<Option<f64>>>,
    relative_humidity_2m_mean: Option<Vec<Option<f64>>>,
    wind_speed_10m_max: Option<Vec<Option<f64>>>,
    uv_index_max: Option<Vec<Option<f64>>>,
}

fn record_from_payload(payload: OpenMeteoResponse) -> crate::Result<ClimateRecord> {
    let daily = payload
        .daily
        .ok_or_else(|| ClimaCertoError::upstream_malformed("Invalid response from Open-Meteo."))?;

    let weather_code = daily
        .weather_code
        .as_ref()
        .and_then(|codes| codes.first())
        .copied()
        .flatten()
        .ok_or_else(|| {
            ClimaCertoError::upstream_malformed(
                "No valid weather code found in Open-Meteo response.",
            )
        })?;

    let temperature_max = first_value(daily.temperature_2m_max.as_ref());
    let temperature_min = first_value(daily.temperature_2m_min.as_ref());
    let humidity = first_value(daily.relative_humidity_2m_mean.as_ref());
    let wind = first_value(daily.wind_speed_10m_max.as_ref());
    let uv_index = first_value(daily.uv_index_max.as_ref());

    Ok(ClimateRecord {
        temperature: (temperature_max + temperature_min) / 2.0,
        humidity,
        wind,
        uv_index,
        condition: condition_from_code(weather_code),
        precipitation: None,
    })
}

fn first_value(series: Option<&Vec<Option<f64>>>) -> f64 {
    series
        .and_then(|values| values.first())
        .copied()
        .flatten()
        .unwrap_or(0.0)
}

/// Map a WMO weather code into the canonical condition.
fn condition_from_code(code: u16) -> WeatherCondition {
    match code {
        0 => WeatherCondition::Clear,
        1..=3 => WeatherCondition::Cloudy,
        45 | 48 => WeatherCondition::Fog,
        51 | 53 | 55 | 61 | 63 | 65 | 80..=82 => WeatherCondition::Rain,
        71 | 73 | 75 | 77 | 85 | 86 => WeatherCondition::Snow,
        95 | 96 | 99 => WeatherCondition::Windy,
        _ => WeatherCondition::Other,
    }
}
