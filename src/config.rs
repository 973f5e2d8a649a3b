//! Engine Configuration
//!
//! Growth rate used for year-gap projection and pagination defaults.
//! Loaded from an optional JSON file, then overridden from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Yearly growth applied to projected values (percent)
pub const DEFAULT_GROWTH_RATE: f64 = 1.5;
pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_PAGE_NUMBER: usize = 1;
/// Widest `startYear..=endYear` a request may ask for
pub const DEFAULT_MAX_YEAR_SPAN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ImpactConfig {
    /// Percent growth per projected year
    pub growth_rate: f64,
    pub default_page_size: usize,
    pub default_page_number: usize,
    /// Upper bound on the number of years in one request
    pub max_year_span: usize,
    /// Response cache (api feature only)
    pub cache_capacity: u64,
    pub cache_ttl_secs: u64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            growth_rate: DEFAULT_GROWTH_RATE,
            default_page_size: DEFAULT_PAGE_SIZE,
            default_page_number: DEFAULT_PAGE_NUMBER,
            max_year_span: DEFAULT_MAX_YEAR_SPAN,
            cache_capacity: 10_000,
            cache_ttl_secs: 300,
        }
    }
}

impl ImpactConfig {
    /// Load configuration from a JSON file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: ImpactConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `IMPACT_GROWTH_RATE` and `IMPACT_PAGE_SIZE` when set
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var("IMPACT_GROWTH_RATE") {
            self.growth_rate = raw
                .trim()
                .parse()
                .with_context(|| format!("IMPACT_GROWTH_RATE is not a number: {}", raw))?;
        }
        if let Ok(raw) = std::env::var("IMPACT_PAGE_SIZE") {
            self.default_page_size = raw
                .trim()
                .parse()
                .with_context(|| format!("IMPACT_PAGE_SIZE is not an integer: {}", raw))?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.growth_rate.is_finite() {
            anyhow::bail!("growthRate must be finite, got {}", self.growth_rate);
        }
        if self.default_page_size == 0 {
            anyhow::bail!("defaultPageSize must be at least 1");
        }
        if self.default_page_number == 0 {
            anyhow::bail!("defaultPageNumber must be at least 1");
        }
        if self.max_year_span == 0 {
            anyhow::bail!("maxYearSpan must be at least 1");
        }
        Ok(())
    }
}
