//! Application configuration: milheiro.toml plus environment overrides.

/// Database configuration and connection management
pub mod database;

/// Operator identity from environment variables
pub mod operator;

/// Pricing parameters for inventory valuation
pub mod pricing;

use crate::errors::{Error, Result};
use pricing::PricingConfig;
use serde::Deserialize;
use std::path::Path;

/// Default configuration file looked up next to the binary's working directory.
pub const DEFAULT_CONFIG_PATH: &str = "milheiro.toml";

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection string
    pub database_url: String,
    /// Valuation parameters for reports
    pub pricing: PricingConfig,
}

/// Raw shape of milheiro.toml; everything is optional.
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    database_url: Option<String>,
    #[serde(default)]
    pricing: PricingConfig,
}

/// Loads application configuration.
///
/// Reads `milheiro.toml` from the working directory when present, then
/// applies environment overrides: `DATABASE_URL` beats the file, which
/// beats the built-in default path.
///
/// # Errors
/// Returns an error if the configuration file exists but cannot be read
/// or parsed. A missing file is not an error.
pub fn load_app_configuration() -> Result<AppConfig> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let file_config = if path.as_ref().exists() {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
            message: format!("Failed to read config file: {e}"),
        })?;
        toml::from_str(&contents).map_err(|e| Error::Config {
            message: format!("Failed to parse {}: {e}", path.as_ref().display()),
        })?
    } else {
        FileConfig::default()
    };

    let database_url = std::env::var("DATABASE_URL")
        .ok()
        .or(file_config.database_url)
        .unwrap_or_else(database::default_database_url);

    Ok(AppConfig {
        database_url,
        pricing: file_config.pricing,
    })
}
