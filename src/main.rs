//! Application entry point for the `ClimaCerto` analysis service.
//!
//! Startup sequence: initialize tracing, load the service configuration and
//! the rules document, build the shared HTTP client, compose the analysis
//! service and serve the router. Any configuration error aborts startup.

use anyhow::Context;
use tracing_subscriber::filter::EnvFilter;

use climacerto::analyze::AnalysisService;
use climacerto::api::{self, AppState};
use climacerto::config::AppConfig;
use climacerto::geocode::Geocoder;
use climacerto::rules::{RuleEngine, RulesConfig};
use climacerto::weather::{ClimateProvider, ClimateService, NasaPowerProvider, OpenMeteoProvider};
use climacerto::web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load()?;
    let rules = RulesConfig::load_from_file(&config.rules.path)
        .with_context(|| format!("Failed to load rules document '{}'", config.rules.path))?;
    tracing::info!(
        "Loaded {} activity rule sets from {}",
        rules.activity_rules.len(),
        config.rules.path
    );

    let client = config.build_client()?;
    let upstream = &config.upstream;

    let geocoder = Geocoder::new(client.clone(), upstream.geocoder_url.clone());
    let providers: Vec<Box<dyn ClimateProvider>> = vec![
        Box::new(NasaPowerProvider::new(
            client.clone(),
            upstream.nasa_power_url.clone(),
        )),
        Box::new(OpenMeteoProvider::new(
            client,
            upstream.open_meteo_url.clone(),
        )),
    ];
    let climate = ClimateService::new(providers);
    let engine = RuleEngine::new(rules);

    let analysis = AnalysisService::new(geocoder, climate, engine);
    let app = api::router(AppState::new(analysis));

    web::run(&config.http, app).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
