//! Configuration management for the `ClimaCerto` service
//!
//! Handles loading configuration from a TOML file and environment
//! variables, and provides validation for all configuration settings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};

use crate::error::ClimaCertoError;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "CLIMACERTO_CONFIG";

/// Root configuration structure for the `ClimaCerto` service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Upstream weather and geocoding settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Rules document settings
    #[serde(default)]
    pub rules: RulesFileConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address
    #[serde(default = "default_http_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_http_port")]
    pub port: u16,
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Upstream weather and geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// NASA POWER daily-point endpoint
    #[serde(default = "default_nasa_power_url")]
    pub nasa_power_url: String,
    /// Open-Meteo forecast endpoint
    #[serde(default = "default_open_meteo_url")]
    pub open_meteo_url: String,
    /// Nominatim search endpoint
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
    /// Per-call timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_upstream_max_retries")]
    pub max_retries: u32,
    /// User-Agent sent on every outbound call (Nominatim requires one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Rules document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesFileConfig {
    /// Path of the rules JSON document
    #[serde(default = "default_rules_path")]
    pub path: String,
}

// Default value functions
fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_nasa_power_url() -> String {
    "https://power.larc.nasa.gov/api/temporal/daily/point".to_string()
}

fn default_open_meteo_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_upstream_max_retries() -> u32 {
    2
}

fn default_user_agent() -> String {
    "ClimaCertoApp/1.0 (contact@climacerto.example)".to_string()
}

fn default_rules_path() -> String {
    "config/rules.json".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            nasa_power_url: default_nasa_power_url(),
            open_meteo_url: default_open_meteo_url(),
            geocoder_url: default_geocoder_url(),
            timeout_seconds: default_upstream_timeout(),
            max_retries: default_upstream_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RulesFileConfig {
    fn default() -> Self {
        Self {
            path: default_rules_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            upstream: UpstreamConfig::default(),
            rules: RulesFileConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map_or_else(|_| PathBuf::from("config/default.toml"), PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from the given path, which may be absent
    pub fn load_from_path(config_file: PathBuf) -> Result<Self> {
        let mut builder = Config::builder();

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. CLIMACERTO_HTTP__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("CLIMACERTO")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.port == 0 {
            return Err(ClimaCertoError::config("http.port must be greater than 0").into());
        }

        if self.http.request_timeout_seconds == 0 || self.http.request_timeout_seconds > 300 {
            return Err(ClimaCertoError::config(
                "http.request_timeout_seconds must be between 1 and 300",
            )
            .into());
        }

        if self.upstream.timeout_seconds == 0 || self.upstream.timeout_seconds > 300 {
            return Err(ClimaCertoError::config(
                "upstream.timeout_seconds must be between 1 and 300",
            )
            .into());
        }

        if self.upstream.max_retries > 10 {
            return Err(
                ClimaCertoError::config("upstream.max_retries cannot exceed 10").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        if self.http.host.is_empty() {
            return Err(ClimaCertoError::config("http.host must not be empty").into());
        }

        for (name, url) in [
            ("upstream.nasa_power_url", &self.upstream.nasa_power_url),
            ("upstream.open_meteo_url", &self.upstream.open_meteo_url),
            ("upstream.geocoder_url", &self.upstream.geocoder_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClimaCertoError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.upstream.user_agent.is_empty() {
            return Err(
                ClimaCertoError::config("upstream.user_agent must not be empty").into(),
            );
        }

        if self.rules.path.is_empty() {
            return Err(ClimaCertoError::config("rules.path must not be empty").into());
        }

        Ok(())
    }

    /// Build the shared outbound HTTP client
    ///
    /// One client serves the geocoder and every weather backend: per-call
    /// timeout, service User-Agent and exponential-backoff retries for
    /// transient transport failures.
    pub fn build_client(&self) -> Result<ClientWithMiddleware> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.upstream.timeout_seconds))
            .user_agent(&self.upstream.user_agent)
            .build()
            .with_context(|| "Failed to build HTTP client")?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(self.upstream.max_retries);

        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}
