//! Ledger configuration.
//!
//! Provides [`LedgerConfig`] with defaults (15% base rate, all gates open,
//! no scheduled changes). It can be built programmatically, loaded from a
//! JSON file, and overridden from `ACCRUE_*` environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use accrue_core::constants::SCALE;
use accrue_core::error::ConfigError;
use accrue_core::types::Timestamp;

use crate::gates::FeatureGates;

/// Default annual base rate: 15%, scaled by 10^18.
pub const DEFAULT_BASE_RATE_PER_YEAR: u128 = 15 * SCALE / 100;

/// A rate change to register when the ledger is constructed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledRate {
    /// Annual rate scaled by 10^18.
    pub rate_per_year: u128,
    pub start_time: Timestamp,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Annual base rate scaled by 10^18.
    pub base_rate_per_year: u128,
    pub deposits_open: bool,
    pub claims_open: bool,
    pub compound_open: bool,
    /// Rate changes registered at construction, validated against the
    /// construction time like any other schedule addition.
    pub schedule: Vec<ScheduledRate>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_rate_per_year: DEFAULT_BASE_RATE_PER_YEAR,
            deposits_open: true,
            claims_open: true,
            compound_open: true,
            schedule: Vec::new(),
        }
    }
}

impl LedgerConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: display,
            reason: e.to_string(),
        })
    }

    /// Apply `ACCRUE_BASE_RATE_PER_YEAR`, `ACCRUE_DEPOSITS_OPEN`,
    /// `ACCRUE_CLAIMS_OPEN` and `ACCRUE_COMPOUND_OPEN` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ACCRUE_BASE_RATE_PER_YEAR") {
            self.base_rate_per_year = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "ACCRUE_BASE_RATE_PER_YEAR".into(),
                value: v.clone(),
            })?;
        }
        for (key, slot) in [
            ("ACCRUE_DEPOSITS_OPEN", &mut self.deposits_open),
            ("ACCRUE_CLAIMS_OPEN", &mut self.claims_open),
            ("ACCRUE_COMPOUND_OPEN", &mut self.compound_open),
        ] {
            if let Some(v) = lookup(key) {
                *slot = parse_flag(key, &v)?;
            }
        }
        Ok(self)
    }

    pub fn gates(&self) -> FeatureGates {
        FeatureGates {
            deposits_open: self.deposits_open,
            claims_open: self.claims_open,
            compound_open: self.compound_open,
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
