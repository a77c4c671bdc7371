//! Configuration management for `WeatherWise`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherWiseError;
use crate::nearby::SelectionParams;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for `WeatherWise`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherWiseConfig {
    /// Weather provider configuration
    pub weather: WeatherConfig,
    /// City dataset configuration
    pub dataset: DatasetConfig,
    /// Nearby-city selection settings
    pub nearby: NearbyConfig,
    /// Presentation settings
    pub display: DisplayConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API key, falls back to `OPENWEATHER_API_KEY`
    pub api_key: Option<String>,
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Timeout for a single nearby-city temperature lookup in seconds
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_seconds: u32,
    /// Number of nearby-city lookups in flight at once
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: u32,
}

/// City dataset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// CSV file with `city`, `country`, `lat`, `lng` columns
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
    /// Only cities of this country are considered
    #[serde(default = "default_dataset_country")]
    pub country: String,
}

/// Nearby-city selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyConfig {
    #[serde(default = "default_radius")]
    pub radius_km: f64,
    #[serde(default = "default_min_separation")]
    pub min_separation_km: f64,
    #[serde(default = "default_near_exclusion")]
    pub near_exclusion_km: f64,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Number of nearby cities shown in the report
    #[serde(default = "default_display_limit")]
    pub display_limit: u32,
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA timezone used for sunrise and sunset
    #[serde(default = "default_timezone")]
    pub timezone: String,
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

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_lookup_timeout() -> u32 {
    5
}

fn default_max_concurrent_lookups() -> u32 {
    8
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/worldcities.csv")
}

fn default_dataset_country() -> String {
    "India".to_string()
}

fn default_radius() -> f64 {
    200.0
}

fn default_min_separation() -> f64 {
    30.0
}

fn default_near_exclusion() -> f64 {
    40.0
}

fn default_max_results() -> u32 {
    6
}

fn default_display_limit() -> u32 {
    5
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            lookup_timeout_seconds: default_lookup_timeout(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            country: default_dataset_country(),
        }
    }
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius(),
            min_separation_km: default_min_separation(),
            near_exclusion_km: default_near_exclusion(),
            max_results: default_max_results(),
            display_limit: default_display_limit(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
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

impl WeatherConfig {
    /// Configured API key, or `OPENWEATHER_API_KEY` from the environment
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENWEATHER_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    #[must_use]
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.lookup_timeout_seconds))
    }
}

impl NearbyConfig {
    /// Selection parameters for the nearby-city selector
    #[must_use]
    pub fn selection_params(&self) -> SelectionParams {
        SelectionParams {
            radius_km: self.radius_km,
            min_separation_km: self.min_separation_km,
            near_exclusion_km: self.near_exclusion_km,
            max_results: self.max_results as usize,
        }
    }
}

impl WeatherWiseConfig {
    /// Load configuration from `config_path`, or the default location when
    /// `None`, with environment variable overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with WEATHERWISE_ prefix
        builder = builder.add_source(
            Environment::with_prefix("WEATHERWISE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherWiseConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherwise").join("config.toml"))
    }

    /// Apply default values to empty or zero configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.lookup_timeout_seconds == 0 {
            self.weather.lookup_timeout_seconds = default_lookup_timeout();
        }
        if self.weather.max_concurrent_lookups == 0 {
            self.weather.max_concurrent_lookups = default_max_concurrent_lookups();
        }
        if self.dataset.path.as_os_str().is_empty() {
            self.dataset.path = default_dataset_path();
        }
        if self.dataset.country.is_empty() {
            self.dataset.country = default_dataset_country();
        }
        if self.display.timezone.is_empty() {
            self.display.timezone = default_timezone();
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
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.weather.api_key {
            if api_key.is_empty() {
                return Err(WeatherWiseError::config(
                    "Weather API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(WeatherWiseError::config(
                    "Weather API key appears to be invalid (too short). Please check your API key."
                ).into());
            }

            if api_key.len() > 100 {
                return Err(WeatherWiseError::config(
                    "Weather API key appears to be invalid (too long). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(WeatherWiseError::config(
                "Weather API timeout cannot exceed 300 seconds"
            ).into());
        }

        if self.weather.lookup_timeout_seconds > self.weather.timeout_seconds {
            return Err(WeatherWiseError::config(
                "Lookup timeout cannot exceed the weather API timeout"
            ).into());
        }

        if self.weather.max_concurrent_lookups > 64 {
            return Err(WeatherWiseError::config(
                "Concurrent lookups cannot exceed 64"
            ).into());
        }

        if self.nearby.radius_km > 1000.0 {
            return Err(WeatherWiseError::config(
                "Search radius cannot exceed 1000 km"
            ).into());
        }

        if self.nearby.max_results > 50 {
            return Err(WeatherWiseError::config(
                "Maximum nearby cities cannot exceed 50"
            ).into());
        }

        self.nearby
            .selection_params()
            .validate()
            .map_err(|e| WeatherWiseError::config(e.to_string()))?;

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherWiseError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherWiseError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        if !self.weather.base_url.starts_with("http://") && !self.weather.base_url.starts_with("https://") {
            return Err(WeatherWiseError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL"
            ).into());
        }

        if self.display.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(WeatherWiseError::config(
                format!("Unknown timezone '{}'", self.display.timezone)
            ).into());
        }

        Ok(())
    }
}
