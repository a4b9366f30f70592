//! Screen award table: exact screen keys plus regex families.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::awards::AwardMode;
use crate::errors::{SyncError, SyncResult};

/// Award for one exact screen key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenAwardConfig {
    pub points: u32,
    #[serde(default)]
    pub achievement_id: Option<String>,
    pub mode: AwardMode,
}

/// Award for every screen key matching `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternAwardConfig {
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
    pub points: u32,
    pub mode: AwardMode,
    /// Achievement id becomes `<prefix>_<screen key>`, lowercased.
    #[serde(default)]
    pub achievement_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardsConfig {
    /// Exact matches. Checked before any pattern.
    pub screens: BTreeMap<String, ScreenAwardConfig>,
    /// Checked in order; first match wins.
    pub patterns: Vec<PatternAwardConfig>,
}

impl AwardsConfig {
    pub fn validate(&self) -> SyncResult<()> {
        for p in &self.patterns {
            Regex::new(&p.pattern).map_err(|e| {
                SyncError::Configuration(format!("awards pattern '{}' does not compile: {}", p.pattern, e))
            })?;
        }
        Ok(())
    }
}
