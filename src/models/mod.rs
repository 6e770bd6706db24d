//! Data models for the ClimaCerto service
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates
//! - Climate: Normalized daily climate data from the weather backends
//! - Analysis: The suitability verdict returned to callers

pub mod analysis;
pub mod climate;
pub mod location;

// Re-export all public types for convenient access
pub use analysis::AnalysisResult;
pub use climate::{ClimateRecord, WeatherCondition};
pub use location::Coordinates;
