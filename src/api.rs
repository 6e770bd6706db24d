//! HTTP surface: query-parameter binding and route wiring.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::analyze::{AnalysisService, CoordsRequest, NameRequest};
use crate::error::ClimaCertoError;
use crate::models::AnalysisResult;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    analysis: Arc<AnalysisService>,
}

impl AppState {
    #[must_use]
    pub fn new(analysis: AnalysisService) -> Self {
        Self {
            analysis: Arc::new(analysis),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze/coords", get(analyze_by_coords))
        .route("/analyze/name", get(analyze_by_name))
        .route("/health", get(health))
        .with_state(state)
}

/// Raw query parameters of `/analyze/coords`.
///
/// Everything binds as an optional string so that missing or malformed input
/// surfaces as a validation error instead of an extractor rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoordsParams {
    latitude: Option<String>,
    longitude: Option<String>,
    date: Option<String>,
    activity_id: Option<String>,
}

/// Raw query parameters of `/analyze/name`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameParams {
    name: Option<String>,
    date: Option<String>,
    activity_id: Option<String>,
}

async fn analyze_by_coords(
    State(state): State<AppState>,
    Query(params): Query<CoordsParams>,
) -> Result<Json<AnalysisResult>, ClimaCertoError> {
    let request = coords_request(params)?;
    let result = state.analysis.analyze_by_coords(request).await?;
    Ok(Json(result))
}

async fn analyze_by_name(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Result<Json<AnalysisResult>, ClimaCertoError> {
    let request = name_request(params)?;
    let result = state.analysis.analyze_by_name(request).await?;
    Ok(Json(result))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn coords_request(params: CoordsParams) -> crate::Result<CoordsRequest> {
    let latitude = non_empty(params.latitude);
    let longitude = non_empty(params.longitude);
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(ClimaCertoError::validation(
            "The 'longitude' and 'latitude' parameters are required.",
        ));
    };
    let date = non_empty(params.date)
        .ok_or_else(|| ClimaCertoError::validation("The 'date' parameter is required."))?;

    // Unparseable coordinates read as NaN and fail range validation with the
    // coordinate-specific message.
    Ok(CoordsRequest {
        latitude: latitude.parse().unwrap_or(f64::NAN),
        longitude: longitude.parse().unwrap_or(f64::NAN),
        date: parse_date(&date)?,
        activity: params.activity_id.unwrap_or_default(),
    })
}

fn name_request(params: NameParams) -> crate::Result<NameRequest> {
    let name = non_empty(params.name)
        .ok_or_else(|| ClimaCertoError::validation("The 'name' parameter is required."))?;
    let date = non_empty(params.date)
        .ok_or_else(|| ClimaCertoError::validation("The 'date' parameter is required."))?;

    Ok(NameRequest {
        name,
        date: parse_date(&date)?,
        activity: params.activity_id.unwrap_or_default(),
    })
}

/// Parse a calendar date, tolerating an ISO datetime by keeping the date part.
fn parse_date(raw: &str) -> crate::Result<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        ClimaCertoError::validation("The 'date' parameter must be a valid date in YYYY-MM-DD format.")
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
