pub mod awards_config;
pub mod gate_config;
pub mod observability_config;
pub mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{SyncError, SyncResult};

pub use awards_config::{AwardsConfig, PatternAwardConfig, ScreenAwardConfig};
pub use gate_config::GateConfig;
pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NichibokuConfig {
    pub storage: StorageConfig,
    pub awards: AwardsConfig,
    pub gate: GateConfig,
    pub observability: ObservabilityConfig,
}

impl NichibokuConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&raw)
            .map_err(|e| SyncError::Configuration(format!("invalid TOML in {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SyncResult<()> {
        self.storage.validate()?;
        self.awards.validate()?;
        Ok(())
    }
}
