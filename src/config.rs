//! Runtime configuration, read from the environment (and `.env` via dotenvy in `main`).

use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::adapters::square::DEFAULT_CURRENCY;

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// ISO currency code for Square money fields.
    pub currency: String,
    /// Stock below this (and above zero) counts as low stock.
    pub low_stock_threshold: u32,
    /// Reject variable products whose variations do not all cover the same attribute names.
    pub require_complete_attributes: bool,
    pub catalog_path: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            require_complete_attributes: true,
            catalog_path: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    InvalidValue { name: &'static str, value: String, reason: String },
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let currency = match lookup("SYNC_CURRENCY") {
            Some(c) if c.trim().len() == 3 && c.trim().chars().all(|ch| ch.is_ascii_alphabetic()) => {
                c.trim().to_uppercase()
            }
            Some(c) => {
                return Err(ConfigError::InvalidValue {
                    name: "SYNC_CURRENCY",
                    value: c,
                    reason: "expected a three-letter currency code".into(),
                })
            }
            None => defaults.currency,
        };
        let low_stock_threshold = match lookup("SYNC_LOW_STOCK_THRESHOLD") {
            Some(v) => v.trim().parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                name: "SYNC_LOW_STOCK_THRESHOLD",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.low_stock_threshold,
        };
        let require_complete_attributes = match lookup("SYNC_REQUIRE_COMPLETE_ATTRIBUTES") {
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::InvalidValue {
                name: "SYNC_REQUIRE_COMPLETE_ATTRIBUTES",
                value: v.clone(),
                reason: "expected true or false".into(),
            })?,
            None => defaults.require_complete_attributes,
        };
        let catalog_path = lookup("SYNC_CATALOG_PATH").filter(|p| !p.trim().is_empty()).map(PathBuf::from);
        if !require_complete_attributes {
            warn!("SYNC_REQUIRE_COMPLETE_ATTRIBUTES is off, sparse option sets will be published");
        }
        Ok(Self { currency, low_stock_threshold, require_complete_attributes, catalog_path })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
