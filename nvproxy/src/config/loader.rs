// src/config/loader.rs

//! # Configuration Loader
//!
//! Reads the proxy's TOML file into a [`Config`]. Missing tables take their
//! defaults; a malformed `driver.version` fails the whole load.

use crate::config::model::{Config, ConfigError};
use log::Level;
use std::{fs, path::Path};

/// Load and parse the configuration at `path`.
/// Logs at DEBUG before reading and INFO on success.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    nvproxy_log!(Level::Debug, "config", "Reading config from {:?}", path);
    let txt = fs::read_to_string(path)?;
    let cfg = parse(&txt)?;
    nvproxy_log!(Level::Info, "config", "Loaded config from {:?}", path);
    Ok(cfg)
}

/// Parse configuration text.
pub fn parse(txt: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(txt)?)
}
