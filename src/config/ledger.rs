//! Ledger settings loading from config.toml
//!
//! The `[ledger]` table controls the chips every new seat receives, an optional upper
//! bound on single transfers, and the unit shown in replies. Every key is optional;
//! a missing file yields the defaults.

use crate::core::transfer::TransferLimits;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Ledger behaviour
    #[serde(default)]
    pub ledger: LedgerSettings,
}

/// Settings applied to every ledger
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Initial allocation used when `create_ledger` is called without one
    pub default_initial_allocation: i64,
    /// Largest amount a single transfer or allocation may carry
    pub max_transfer_amount: Option<i64>,
    /// Unit name used in replies (e.g., "chips", "points")
    pub unit_label: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            default_initial_allocation: 2000,
            max_transfer_amount: None,
            unit_label: "chips".to_string(),
        }
    }
}

impl LedgerSettings {
    /// Limits handed to the ingestion boundary.
    #[must_use]
    pub const fn limits(&self) -> TransferLimits {
        TransferLimits {
            max_amount: self.max_transfer_amount,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.default_initial_allocation <= 0 {
            return Err(Error::Config {
                message: format!(
                    "default_initial_allocation must be positive, got {}",
                    self.default_initial_allocation
                ),
            });
        }
        match self.max_transfer_amount {
            Some(max) if max <= 0 => Err(Error::Config {
                message: format!("max_transfer_amount must be positive, got {max}"),
            }),
            _ => Ok(()),
        }
    }
}

/// Parses and validates configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a value is out of range.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.ledger.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `POINT_HIVE_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: the defaults are used instead.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_config() -> Result<Config> {
    let path =
        std::env::var("POINT_HIVE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::info!("No configuration file at {}, using defaults", path);
        return Ok(Config::default());
    }
    load_config(path)
}
