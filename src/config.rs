//! Configuration management for the roadbite application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RoadbiteError;
use crate::search::{LookupParams, PolicyPreset, SearchPolicy};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Root configuration structure for the roadbite application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadbiteConfig {
    /// Google Maps web service configuration
    #[serde(default)]
    pub google: GoogleConfig,
    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP API settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Google Maps web service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Maps Platform API key
    pub api_key: Option<String>,
    /// Base URL for the web services
    #[serde(default = "default_google_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_google_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures, 0 disables retrying
    #[serde(default)]
    pub max_retries: u32,
}

/// Search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Policy preset name
    #[serde(default)]
    pub policy: PolicyPreset,
    /// Nearby search radius in metres
    #[serde(default = "default_radius")]
    pub radius_m: u32,
    /// Place type to search for
    #[serde(default = "default_category")]
    pub category: String,
    /// Free-text keyword sent along with every lookup
    #[serde(default = "default_keyword")]
    pub keyword: Option<String>,
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
    /// OTLP/HTTP collector endpoint; traces are only exported when set
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_google_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_google_timeout() -> u32 {
    30
}

fn default_radius() -> u32 {
    2000
}

fn default_category() -> String {
    "restaurant".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_keyword() -> Option<String> {
    Some("restaurant food dining".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_google_base_url(),
            timeout_seconds: default_google_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            policy: PolicyPreset::default(),
            radius_m: default_radius(),
            category: default_category(),
            keyword: default_keyword(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl RoadbiteConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
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

        // Add environment variable overrides with ROADBITE_ prefix
        builder = builder.add_source(
            Environment::with_prefix("ROADBITE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RoadbiteConfig = settings
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
        dirs::config_dir().map(|dir| dir.join("roadbite").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.google.base_url.is_empty() {
            self.google.base_url = default_google_base_url();
        }
        if self.google.timeout_seconds == 0 {
            self.google.timeout_seconds = default_google_timeout();
        }
        if self.search.radius_m == 0 {
            self.search.radius_m = default_radius();
        }
        if self.search.category.is_empty() {
            self.search.category = default_category();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// A configured key must look plausible; a missing one is checked later
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.google.api_key {
            if api_key.trim().is_empty() {
                return Err(RoadbiteError::config(
                    "Google Maps API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 || api_key.len() > 100 {
                return Err(RoadbiteError::config(
                    "Google Maps API key appears to be invalid. Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.google.timeout_seconds > 300 {
            return Err(RoadbiteError::config(
                "Google Maps timeout cannot exceed 300 seconds"
            ).into());
        }

        if self.google.max_retries > 10 {
            return Err(RoadbiteError::config(
                "Google Maps max retries cannot exceed 10"
            ).into());
        }

        if self.search.radius_m > 50_000 {
            return Err(RoadbiteError::config(
                "Search radius cannot exceed 50000 metres"
            ).into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RoadbiteError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RoadbiteError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        if !self.google.base_url.starts_with("http://") && !self.google.base_url.starts_with("https://") {
            return Err(RoadbiteError::config(
                "Google Maps base URL must be a valid HTTP or HTTPS URL"
            ).into());
        }

        Ok(())
    }

    /// Configured API key, falling back to the `GOOGLE_MAPS_API_KEY` variable
    pub fn google_api_key(&self) -> Result<String> {
        self.google
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                RoadbiteError::config(format!(
                    "No Google Maps API key. Set google.api_key or {API_KEY_ENV}."
                ))
                .into()
            })
    }

    /// Search policy from the configured preset and lookup settings
    #[must_use]
    pub fn search_policy(&self, preset: Option<PolicyPreset>) -> SearchPolicy {
        SearchPolicy {
            lookup: LookupParams {
                radius_m: self.search.radius_m,
                category: self.search.category.clone(),
                keyword: self.search.keyword.clone(),
            },
            ..preset.unwrap_or(self.search.policy).policy()
        }
    }
}
