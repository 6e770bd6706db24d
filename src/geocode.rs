//! Location-name resolution through the Nominatim geocoder.

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::error::ClimaCertoError;
use crate::models::Coordinates;

pub struct Geocoder {
    client: ClientWithMiddleware,
    base_url: String,
}

impl Geocoder {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Resolve a free-form location name into coordinates.
    ///
    /// Only the best-ranked hit is requested; an empty result list means the
    /// name is unknown and maps to a not-found error.
    pub async fn resolve(&self, name: &str) -> crate::Result<Coordinates> {
        let url = format!(
            "{}?format=json&q={}&limit=1",
            self.base_url,
            urlencoding::encode(name)
        );

        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|err| {
                tracing::debug!(error = %err, "geocoding request failed");
                ClimaCertoError::upstream_unavailable(
                    "Could not get geolocation data at the moment.",
                )
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "geocoder returned an error status");
            return Err(ClimaCertoError::upstream_unavailable(
                "Could not get geolocation data at the moment.",
            ));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|err| {
            tracing::debug!(error = %err, "geocoder payload did not parse");
            ClimaCertoError::upstream_malformed("Invalid response from the geocoding service.")
        })?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| ClimaCertoError::not_found(format!("Location not found: {name}")))?;

        place.into_coordinates()
    }
}

/// One search hit from Nominatim; coordinates arrive as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn into_coordinates(self) -> crate::Result<Coordinates> {
        match (self.lat.parse::<f64>(), self.lon.parse::<f64>()) {
            (Ok(latitude), Ok(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            _ => Err(ClimaCertoError::upstream_malformed(
                "Invalid response from the geocoding service.",
            )),
        }
    }
}
