//! Suitability analysis orchestration.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::geocode::Geocoder;
use crate::models::{AnalysisResult, Coordinates};
use crate::rules::RuleEngine;
use crate::weather::ClimateService;

/// Analysis request addressed by geographic point.
#[derive(Debug, Clone)]
pub struct CoordsRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub date: NaiveDate,
    pub activity: String,
}

/// Analysis request addressed by location name.
#[derive(Debug, Clone)]
pub struct NameRequest {
    pub name: String,
    pub date: NaiveDate,
    pub activity: String,
}

/// Ties geocoding, climate acquisition and the rule engine together.
pub struct AnalysisService {
    geocoder: Geocoder,
    climate: ClimateService,
    engine: RuleEngine,
}

impl AnalysisService {
    #[must_use]
    pub fn new(geocoder: Geocoder, climate: ClimateService, engine: RuleEngine) -> Self {
        Self {
            geocoder,
            climate,
            engine,
        }
    }

    /// Analyze suitability for a geographic point on a given day.
    #[instrument(skip(self))]
    pub async fn analyze_by_coords(
        &self,
        request: CoordsRequest,
    ) -> crate::Result<AnalysisResult> {
        let coords = Coordinates::new(request.latitude, request.longitude);
        let record = self.climate.fetch_by_coords(coords, request.date).await?;
        debug!(
            "Climate at {}: {:.1}°C, wind {:.1} m/s, {}",
            coords.format_coordinates(),
            record.temperature,
            record.wind,
            record.condition.as_str()
        );

        let result = self.engine.analyze(&record, &request.activity.to_lowercase());
        info!(
            "Scored {} ({}) for activity '{}' on {}",
            result.score, result.qualitative, request.activity, request.date
        );

        Ok(result)
    }

    /// Analyze suitability for a named location on a given day.
    #[instrument(skip(self))]
    pub async fn analyze_by_name(&self, request: NameRequest) -> crate::Result<AnalysisResult> {
        let coords = self.geocoder.resolve(&request.name).await?;
        debug!(
            "Resolved '{}' to {}",
            request.name,
            coords.format_coordinates()
        );

        self.analyze_by_coords(CoordsRequest {
            latitude: coords.latitude,
            longitude: coords.longitude,
            date: request.date,
            activity: request.activity,
        })
        .await
    }
}
