//! Simulator configuration
//!
//! Layers, lowest priority first:
//! 1. Built-in defaults (64 slots, 8-slot units, 2-slot pages, paged mode)
//! 2. Optional TOML file
//! 3. `SLOTSIM_*` environment variables (e.g. `SLOTSIM_TOTAL_SLOTS=128`)

use crate::error::{Error, Result};
use crate::memory::AllocationMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Arena geometry and starting mode
///
/// Geometry is fixed once a simulator is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Slots in the arena
    pub total_slots: usize,
    /// Slots per unit in standard mode (the maximum sequence length)
    pub unit_size: usize,
    /// Slots per page in paged mode
    pub page_size: usize,
    /// Strategy used until the first reset
    pub mode: AllocationMode,
    /// Seed for page selection; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            total_slots: 64,
            unit_size: 8,
            page_size: 2,
            mode: AllocationMode::Paged,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| Error::Config(format!("Failed to encode defaults: {}", e)))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(config::Environment::with_prefix("SLOTSIM").try_parsing(true));

        let settings = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to read configuration: {}", e)))?;
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to encode TOML: {}", e)))
    }

    /// Reject geometry the allocators cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.total_slots == 0 {
            return Err(Error::Config("total_slots must be positive".to_string()));
        }
        if self.unit_size == 0 {
            return Err(Error::Config("unit_size must be positive".to_string()));
        }
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be positive".to_string()));
        }
        if self.total_slots % self.page_size != 0 {
            return Err(Error::Config(format!(
                "total_slots ({}) must be a multiple of page_size ({})",
                self.total_slots, self.page_size
            )));
        }
        Ok(())
    }

    /// Pages in the arena
    pub fn total_pages(&self) -> usize {
        self.total_slots / self.page_size
    }
}
