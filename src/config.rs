use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::core::ControllerConfig;
use crate::models::{Coordinate, ValidationError};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub url: String,
    #[serde(default = "default_search_path")]
    pub search_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_search_path() -> String { "/search/stations".to_string() }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
    #[serde(default = "default_distance_filter")]
    pub distance_filter: bool,
    #[serde(default = "default_distance_m")]
    pub default_distance_m: f64,
    #[serde(default = "default_initial_radius_m")]
    pub initial_radius_m: f64,
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            items_per_page: default_items_per_page(),
            distance_filter: default_distance_filter(),
            default_distance_m: default_distance_m(),
            initial_radius_m: default_initial_radius_m(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

fn default_items_per_page() -> u32 { 200 }
fn default_distance_filter() -> bool { true }
fn default_distance_m() -> f64 { 1000.0 }
fn default_initial_radius_m() -> f64 { 5000.0 }
fn default_latitude() -> f64 { 48.8566 }
fn default_longitude() -> f64 { 2.3522 }

impl SearchSettings {
    /// Controller parameters; fails if the default center is out of range
    pub fn controller_config(&self) -> Result<ControllerConfig, ValidationError> {
        Ok(ControllerConfig {
            max_results: self.items_per_page,
            distance_filter_enabled: self.distance_filter,
            default_center: Coordinate::new(self.default_latitude, self.default_longitude)?,
            initial_radius_meters: self.initial_radius_m,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with STATIONS__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., STATIONS__BACKEND__URL -> backend.url
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("STATIONS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
