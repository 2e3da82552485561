// src/config/model.rs

use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use crate::version::DriverVersion;

/// Top-level runtime config
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)] pub logging:  LoggingConfig,
    #[serde(default)] pub driver:   DriverConfig,
    #[serde(default)] pub dispatch: DispatchConfig,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]                   pub enable: bool,
    #[serde(default)]                   pub file:   Option<String>,
    #[serde(default = "default_level")] pub level:  String,
}
fn default_level() -> String { "INFO".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: default_level() }
    }
}

impl LoggingConfig {
    /// Unknown level names fall back to INFO.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.to_uppercase().as_str() {
            "OFF"   => LevelFilter::Off,
            "ERROR" => LevelFilter::Error,
            "WARN"  => LevelFilter::Warn,
            "DEBUG" => LevelFilter::Debug,
            "TRACE" => LevelFilter::Trace,
            _       => LevelFilter::Info,
        }
    }
}

/// Mirror of the `[driver]` table. The version is checked while parsing.
#[derive(Debug, Default, Deserialize)]
pub struct DriverConfig {
    #[serde(default)] pub version: Option<DriverVersion>,
}

/// Mirror of the `[dispatch]` table
#[derive(Debug, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_true")] pub log_rejections: bool,
}
fn default_true() -> bool { true }

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { log_rejections: true }
    }
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
