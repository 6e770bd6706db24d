//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

use crate::error::ClimaCertoError;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and within range
    pub fn validate(&self) -> crate::Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ClimaCertoError::validation(
                "Latitude must be a number between -90 and 90 degrees.",
            ));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ClimaCertoError::validation(
                "Longitude must be a number between -180 and 180 degrees.",
            ));
        }
        Ok(())
    }

    /// Format coordinates for log output
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        assert!(Coordinates::new(46.8182, 8.2275).validate().is_ok());
        assert!(Coordinates::new(-90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(90.0, -180.0).validate().is_ok());
        assert!(Coordinates::new(0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_out_of_range_latitude() {
        let err = Coordinates::new(91.0, 0.0).validate().unwrap_err();
        assert!(err.message().contains("Latitude"));
    }

    #[test]
    fn test_out_of_range_longitude() {
        let err = Coordinates::new(0.0, -180.5).validate().unwrap_err();
        assert!(err.message().contains("Longitude"));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_format_coordinates() {
        let coords = Coordinates::new(46.818_234, 8.227_456);
        assert_eq!(coords.format_coordinates(), "46.8182, 8.2275");
    }
}
