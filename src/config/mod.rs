//! Application configuration loaded from config.toml
//!
//! Every section is optional. A missing `[[packages]]` list falls back to the
//! built-in prices and a missing `[routes]` table to the built-in route lists.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Database configuration and connection management
pub mod database;

/// Membership package price table
pub mod packages;

/// Post-authentication route permission table
pub mod routes;

pub use packages::{PackageConfig, PackageTable};
pub use routes::RouteTable;

/// Raw structure of the config.toml file
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    packages: Option<Vec<PackageConfig>>,
    #[serde(default)]
    routes: RouteTable,
}

/// Validated application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Price for each purchasable tier
    pub packages: PackageTable,
    /// Landing pages and restricted paths
    pub routes: RouteTable,
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML syntax is invalid or the package table
/// does not validate.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let raw: RawConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    let packages = match raw.packages {
        Some(list) => PackageTable::from_configs(&list)?,
        None => PackageTable::default(),
    };

    Ok(AppConfig {
        packages,
        routes: raw.routes,
    })
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The package table does not validate
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config("config.toml")
}
