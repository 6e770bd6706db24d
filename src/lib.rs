//! `ClimaCerto` - weather suitability analysis for outdoor activities
//!
//! The service resolves a location, fetches one day of climate data from
//! external weather backends and scores it against a configurable rule set.

pub mod analyze;
pub mod api;
pub mod config;
pub mod error;
pub mod geocode;
pub mod models;
pub mod rules;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use analyze::{AnalysisService, CoordsRequest, NameRequest};
pub use api::AppState;
pub use config::AppConfig;
pub use error::ClimaCertoError;
pub use geocode::Geocoder;
pub use models::{AnalysisResult, ClimateRecord, Coordinates, WeatherCondition};
pub use rules::{RuleEngine, RulesConfig};
pub use weather::{ClimateProvider, ClimateService, NasaPowerProvider, OpenMeteoProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ClimaCertoError>;
