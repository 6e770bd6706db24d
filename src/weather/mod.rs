//! Climate data acquisition from external weather backends.
//!
//! Each backend implements [`ClimateProvider`] and maps its own payload into
//! the canonical [`ClimateRecord`]. [`ClimateService`] tries the configured
//! backends in order and falls over on transient failures.

pub mod nasa_power;
pub mod open_meteo;

pub use nasa_power::NasaPowerProvider;
pub use open_meteo::OpenMeteoProvider;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::ClimaCertoError;
use crate::models::{ClimateRecord, Coordinates};

/// A single weather backend.
#[async_trait]
pub trait ClimateProvider: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch one day of climate data for the given point.
    async fn fetch(&self, coords: Coordinates, date: NaiveDate) -> crate::Result<ClimateRecord>;
}

/// Ordered fallback chain over the configured weather backends.
pub struct ClimateService {
    providers: Vec<Box<dyn ClimateProvider>>,
}

impl ClimateService {
    #[must_use]
    pub fn new(providers: Vec<Box<dyn ClimateProvider>>) -> Self {
        Self { providers }
    }

    /// Fetch climate data for a point, trying each backend in order.
    ///
    /// Definitive errors (invalid input, unknown location) propagate
    /// immediately. Transient failures are logged and the next backend is
    /// tried; once the chain is exhausted the caller sees the last backend's
    /// upstream error, or a generic service-unavailable error when no backend
    /// produced one.
    pub async fn fetch_by_coords(
        &self,
        coords: Coordinates,
        date: NaiveDate,
    ) -> crate::Result<ClimateRecord> {
        coords.validate()?;

        let mut last_error: Option<ClimaCertoError> = None;

        for provider in &self.providers {
            match provider.fetch(coords, date).await {
                Ok(record) => {
                    tracing::debug!(provider = provider.name(), "climate data fetched");
                    return Ok(record);
                }
                Err(err) if err.is_definitive() => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %err,
                        "weather backend failed, trying next"
                    );
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(
                err @ (ClimaCertoError::UpstreamMalformed { .. }
                | ClimaCertoError::UpstreamUnavailable { .. }),
            ) => Err(err),
            _ => Err(ClimaCertoError::upstream_unavailable(
                "No weather backend could provide climate data at the moment.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::WeatherCondition;

    #[derive(Clone, Copy)]
    enum StubOutcome {
        Success,
        Unavailable,
        Malformed,
        Invalid,
    }

    struct StubProvider {
        name: &'static str,
        outcome: StubOutcome,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn boxed(
            name: &'static str,
            outcome: StubOutcome,
        ) -> (Box<dyn ClimateProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                name,
                outcome,
                calls: Arc::clone(&calls),
            };
            (Box::new(provider), calls)
        }
    }

    #[async_trait]
    impl ClimateProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(
            &self,
            _coords: Coordinates,
            _date: NaiveDate,
        ) -> crate::Result<ClimateRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                StubOutcome::Success => Ok(ClimateRecord {
                    temperature: 21.0,
                    humidity: 55.0,
                    wind: 3.0,
                    uv_index: 5.0,
                    condition: WeatherCondition::Clear,
                    precipitation: None,
                }),
                StubOutcome::Unavailable => {
                    Err(ClimaCertoError::upstream_unavailable("stub backend down"))
                }
                StubOutcome::Malformed => {
                    Err(ClimaCertoError::upstream_malformed("stub payload broken"))
                }
                StubOutcome::Invalid => Err(ClimaCertoError::validation("stub rejected input")),
            }
        }
    }

    fn valid_coords() -> Coordinates {
        Coordinates::new(48.1372, 11.5756)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[tokio::test]
    async fn first_successful_backend_short_circuits() {
        let (primary, primary_calls) = StubProvider::boxed("primary", StubOutcome::Success);
        let (secondary, secondary_calls) = StubProvider::boxed("secondary", StubOutcome::Success);
        let service = ClimateService::new(vec![primary, secondary]);

        let record = service
            .fetch_by_coords(valid_coords(), date())
            .await
            .unwrap();

        assert_eq!(record.condition, WeatherCondition::Clear);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transient_failure_falls_over_to_next_backend() {
        let (primary, primary_calls) = StubProvider::boxed("primary", StubOutcome::Unavailable);
        let (secondary, secondary_calls) = StubProvider::boxed("secondary", StubOutcome::Success);
        let service = ClimateService::new(vec![primary, secondary]);

        let record = service
            .fetch_by_coords(valid_coords(), date())
            .await
            .unwrap();

        assert_eq!(record.temperature, 21.0);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_payload_also_falls_over() {
        let (primary, _) = StubProvider::boxed("primary", StubOutcome::Malformed);
        let (secondary, secondary_calls) = StubProvider::boxed("secondary", StubOutcome::Success);
        let service = ClimateService::new(vec![primary, secondary]);

        assert!(service.fetch_by_coords(valid_coords(), date()).await.is_ok());
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_surfaces_last_unavailable_error() {
        let (primary, _) = StubProvider::boxed("primary", StubOutcome::Unavailable);
        let (secondary, _) = StubProvider::boxed("secondary", StubOutcome::Unavailable);
        let service = ClimateService::new(vec![primary, secondary]);

        let err = service
            .fetch_by_coords(valid_coords(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, ClimaCertoError::UpstreamUnavailable { .. }));
        assert_eq!(err.message(), "stub backend down");
    }

    #[tokio::test]
    async fn exhausted_chain_surfaces_last_malformed_error() {
        let (primary, _) = StubProvider::boxed("primary", StubOutcome::Unavailable);
        let (secondary, _) = StubProvider::boxed("secondary", StubOutcome::Malformed);
        let service = ClimateService::new(vec![primary, secondary]);

        let err = service
            .fetch_by_coords(valid_coords(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, ClimaCertoError::UpstreamMalformed { .. }));
    }

    #[tokio::test]
    async fn definitive_error_stops_the_chain() {
        let (primary, _) = StubProvider::boxed("primary", StubOutcome::Invalid);
        let (secondary, secondary_calls) = StubProvider::boxed("secondary", StubOutcome::Success);
        let service = ClimateService::new(vec![primary, secondary]);

        let err = service
            .fetch_by_coords(valid_coords(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, ClimaCertoError::Validation { .. }));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_coordinates_never_reach_a_backend() {
        let (primary, primary_calls) = StubProvider::boxed("primary", StubOutcome::Success);
        let service = ClimateService::new(vec![primary]);

        let err = service
            .fetch_by_coords(Coordinates::new(91.0, 0.0), date())
            .await
            .unwrap_err();

        assert!(matches!(err, ClimaCertoError::Validation { .. }));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_chain_reports_unavailable() {
        let service = ClimateService::new(Vec::new());

        let err = service
            .fetch_by_coords(valid_coords(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, ClimaCertoError::UpstreamUnavailable { .. }));
    }
}
