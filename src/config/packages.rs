//! Membership package price table, optionally loaded from config.toml
//!
//! Each purchasable tier has exactly one price. Bronze is the free default tier and
//! can never be listed. When no `[[packages]]` section is configured the built-in
//! prices apply: Silver 199, Gold 399, Platinum 599.

use crate::core::badge::Badge;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Configuration for a single purchasable package
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    /// Tier name (e.g., "Silver"); matched case-insensitively
    pub name: String,
    /// Price in currency-agnostic units
    pub price: i64,
}

/// Validated tier to price mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTable {
    prices: BTreeMap<Badge, i64>,
}

impl Default for PackageTable {
    fn default() -> Self {
        Self {
            prices: BTreeMap::from([
                (Badge::Silver, 199),
                (Badge::Gold, 399),
                (Badge::Platinum, 599),
            ]),
        }
    }
}

impl PackageTable {
    /// Builds a table from configured packages.
    ///
    /// # Errors
    /// Returns `Error::Config` if:
    /// - A package names an unknown tier or Bronze
    /// - A tier is listed twice
    /// - A price is zero or negative
    pub fn from_configs(packages: &[PackageConfig]) -> Result<Self> {
        let mut prices = BTreeMap::new();
        for package in packages {
            let badge = Badge::parse(&package.name).ok_or_else(|| Error::Config {
                message: format!("Unknown package tier: {}", package.name),
            })?;
            if badge == Badge::LOWEST {
                return Err(Error::Config {
                    message: format!("{badge} is the default tier and cannot be sold"),
                });
            }
            if package.price <= 0 {
                return Err(Error::Config {
                    message: format!("Package {badge} must have a positive price"),
                });
            }
            if prices.insert(badge, package.price).is_some() {
                return Err(Error::Config {
                    message: format!("Package {badge} is listed more than once"),
                });
            }
        }
        Ok(Self { prices })
    }

    /// Price for `badge`, or `None` if the tier is not sold.
    #[must_use]
    pub fn price_of(&self, badge: Badge) -> Option<i64> {
        self.prices.get(&badge).copied()
    }

    /// Purchasable tiers with their prices, lowest tier first.
    pub fn iter(&self) -> impl Iterator<Item = (Badge, i64)> + '_ {
        self.prices.iter().map(|(badge, price)| (*badge, *price))
    }
}
