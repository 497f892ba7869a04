//! Configuration management for the halfway application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::HalfwayError;
use crate::midpoint::FairnessThresholds;
use crate::ranking::RankingOptions;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the maps credential
pub const API_KEY_ENV_VAR: &str = "GOOGLE_MAPS_API_KEY";

/// Root configuration structure for the halfway application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HalfwayConfig {
    /// Maps provider configuration
    pub maps: MapsConfig,
    /// Nearby search and ranking settings
    pub search: SearchConfig,
    /// Fairness label thresholds
    pub fairness: FairnessThresholds,
    /// Response cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// HTTP server settings
    pub server: ServerConfig,
}

/// Maps provider configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Google Maps API key; every call fails with `MissingApiKey` without it
    pub api_key: Option<String>,
    /// Base URL for the maps web services
    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_maps_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_maps_max_retries")]
    pub max_retries: u32,
    /// Lower bound of the exponential backoff in milliseconds
    #[serde(default = "default_retry_min_delay")]
    pub retry_min_delay_ms: u64,
    /// Upper bound of the exponential backoff in milliseconds
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_ms: u64,
}

/// Nearby search and ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search radius around the midpoint in metres
    #[serde(default = "default_search_radius")]
    pub radius_meters: u32,
    /// Provider place type to search for (cafe, restaurant, ...)
    pub category: Option<String>,
    /// Maximum number of places to return
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Drop places one party reaches this much further than the other
    pub max_travel_imbalance_km: Option<f64>,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider responses on disk
    #[serde(default)]
    pub enabled: bool,
    /// Cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

// Default value functions
fn default_maps_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_maps_timeout() -> u32 {
    15
}

fn default_maps_max_retries() -> u32 {
    2
}

fn default_retry_min_delay() -> u64 {
    500
}

fn default_retry_max_delay() -> u64 {
    4000
}

fn default_search_radius() -> u32 {
    5000
}

fn default_max_results() -> u32 {
    20
}

fn default_cache_ttl() -> u32 {
    24
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("halfway").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".halfway-cache".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_maps_base_url(),
            timeout_seconds: default_maps_timeout(),
            max_retries: default_maps_max_retries(),
            retry_min_delay_ms: default_retry_min_delay(),
            retry_max_delay_ms: default_retry_max_delay(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_meters: default_search_radius(),
            category: None,
            max_results: default_max_results(),
            max_travel_imbalance_km: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl MapsConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Configured key, ignoring blank values
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

impl SearchConfig {
    #[must_use]
    pub fn ranking_options(&self) -> RankingOptions {
        RankingOptions {
            max_travel_imbalance_km: self.max_travel_imbalance_km,
            max_results: usize::try_from(self.max_results).ok(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 60 * 60)
    }
}

impl HalfwayConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // HALFWAY__MAPS__API_KEY, HALFWAY__SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("HALFWAY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: HalfwayConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.maps.api_key().is_none() {
            config.maps.api_key = std::env::var(API_KEY_ENV_VAR).ok();
        }

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("halfway").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.maps.base_url.is_empty() {
            self.maps.base_url = default_maps_base_url();
        }
        if self.maps.timeout_seconds == 0 {
            self.maps.timeout_seconds = default_maps_timeout();
        }
        if self.search.radius_meters == 0 {
            self.search.radius_meters = default_search_radius();
        }
        if self.search.max_results == 0 {
            self.search.max_results = default_max_results();
        }
        if self.search.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.search.category = None;
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// A missing key is allowed (calls degrade to `MissingApiKey`), a
    /// malformed one is not
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = self.maps.api_key() {
            if api_key.len() < 8 {
                return Err(HalfwayError::config(
                    "Maps API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.chars().any(char::is_whitespace) {
                return Err(HalfwayError::config(
                    "Maps API key must not contain whitespace. Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.maps.timeout_seconds > 120 {
            return Err(HalfwayError::config("Maps API timeout cannot exceed 120 seconds").into());
        }

        if self.maps.max_retries > 5 {
            return Err(HalfwayError::config("Maps API max retries cannot exceed 5").into());
        }

        if self.maps.retry_min_delay_ms > self.maps.retry_max_delay_ms {
            return Err(HalfwayError::config(
                "Retry minimum delay cannot exceed the maximum delay",
            )
            .into());
        }

        if self.search.radius_meters > 50_000 {
            return Err(HalfwayError::config(
                "Search radius cannot exceed 50000 meters",
            )
            .into());
        }

        if self.search.max_results > 60 {
            return Err(HalfwayError::config("Maximum results cannot exceed 60").into());
        }

        if self
            .search
            .max_travel_imbalance_km
            .is_some_and(|km| !km.is_finite() || km < 0.0)
        {
            return Err(HalfwayError::config(
                "Maximum travel imbalance must be a non-negative number",
            )
            .into());
        }

        if !self.fairness.is_valid() {
            return Err(HalfwayError::config(
                "Fairness thresholds must be non-negative and strictly increasing",
            )
            .into());
        }

        if self.cache.ttl_hours > 24 * 30 {
            return Err(HalfwayError::config("Cache TTL cannot exceed 720 hours (30 days)").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(HalfwayError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(HalfwayError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.maps.base_url.starts_with("http://") && !self.maps.base_url.starts_with("https://") {
            return Err(HalfwayError::config("Maps API base URL must be a valid HTTP or HTTPS URL").into());
        }

        Ok(())
    }
}
