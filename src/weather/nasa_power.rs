//! NASA POWER daily-point backend, the primary climate data source.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use super::ClimateProvider;
use crate::error::ClimaCertoError;
use crate::models::{ClimateRecord, Coordinates, WeatherCondition};

/// Daily precipitation above this many millimeters always reads as rain.
const RAIN_THRESHOLD_MM: f64 = 2.0;

pub struct NasaPowerProvider {
    client: ClientWithMiddleware,
    base_url: String,
}

impl NasaPowerProvider {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl ClimateProvider for NasaPowerProvider {
    fn name(&self) -> &'static str {
        "nasa-power"
    }

    async fn fetch(&self, coords: Coordinates, date: NaiveDate) -> crate::Result<ClimateRecord> {
        let day = date.format("%Y%m%d").to_string();
        let url = format!(
            "{}?parameters=T2M_MAX,T2M_MIN,RH2M,WS10M,ALLSKY_SFC_UV_INDEX,PRECTOTCORR&community=RE&longitude={}&latitude={}&start={}&end={}&format=JSON",
            self.base_url, coords.longitude, coords.latitude, day, day
        );

        let response = self.client.get(url).send().await.map_err(|err| {
            tracing::debug!(error = %err, "NASA POWER request failed");
            ClimaCertoError::upstream_unavailable("NASA POWER API is currently unavailable.")
        })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "NASA POWER returned an error status");
            return Err(ClimaCertoError::upstream_unavailable(
                "NASA POWER API is currently unavailable.",
            ));
        }

        let payload: NasaPowerResponse = response.json().await.map_err(|err| {
            tracing::debug!(error = %err, "NASA POWER payload did not parse");
            ClimaCertoError::upstream_malformed("Invalid response from NASA POWER.")
        })?;

        record_from_payload(payload)
    }
}

/// Daily-point response from NASA POWER.
///
/// Metrics arrive keyed by parameter name, then by `YYYYMMDD` date.
#[derive(Debug, Deserialize)]
struct NasaPowerResponse {
    properties: Option<NasaPowerProperties>,
}

#[derive(Debug, Deserialize)]
struct NasaPowerProperties {
    parameter: Option<BTreeMap<String, BTreeMap<String, f64>>>,
}

fn record_from_payload(payload: NasaPowerResponse) -> crate::Result<ClimateRecord> {
    let parameters = payload
        .properties
        .and_then(|properties| properties.parameter)
        .ok_or_else(|| ClimaCertoError::upstream_malformed("Invalid response from NASA POWER."))?;

    // The first date key of T2M_MAX selects the day for every other metric.
    let (day, temperature_max) = parameters
        .get("T2M_MAX")
        .ok_or_else(|| ClimaCertoError::upstream_malformed("Invalid response from NASA POWER."))?
        .iter()
        .next()
        .map(|(day, value)| (day.clone(), *value))
        .ok_or_else(|| {
            ClimaCertoError::upstream_malformed("No valid date found in NASA POWER response.")
        })?;

    let metric = |name: &str| {
        parameters
            .get(name)
            .and_then(|series| series.get(&day))
            .copied()
    };

    let temperature_min = metric("T2M_MIN").unwrap_or(0.0);
    let humidity = metric("RH2M").unwrap_or(0.0);
    let wind = metric("WS10M").unwrap_or(0.0);
    let uv_index = metric("ALLSKY_SFC_UV_INDEX").ok_or_else(|| {
        ClimaCertoError::upstream_malformed("NASA POWER response is missing the UV index series.")
    })?;
    let precipitation = metric("PRECTOTCORR").ok_or_else(|| {
        ClimaCertoError::upstream_malformed(
            "NASA POWER response is missing the precipitation series.",
        )
    })?;

    Ok(ClimateRecord {
        temperature: (temperature_max + temperature_min) / 2.0,
        humidity,
        wind,
        uv_index,
        condition: condition_from(uv_index, precipitation),
        precipitation: Some(precipitation),
    })
}

/// Derive the canonical condition from UV index and precipitation.
///
/// NASA POWER has no condition field, so heavy precipitation reads as rain
/// and the UV index bands stand in for sky cover otherwise.
fn condition_from(uv_index: f64, precipitation: f64) -> WeatherCondition {
    if precipitation > RAIN_THRESHOLD_MM {
        WeatherCondition::Rain
    } else if uv_index < 2.0 {
        WeatherCondition::Fog
    } else if uv_index < 4.0 {
        WeatherCondition::Cloudy
    } else if uv_index < 7.0 {
        WeatherCondition::Clear
    } else if uv_index < 9.0 {
        WeatherCondition::Windy
    } else {
        WeatherCondition::Other
    }
}
