//! AwardCatalog: resolve a screen key against the configured award table.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use super::AwardMode;
use crate::config::{AwardsConfig, PatternAwardConfig, ScreenAwardConfig};
use crate::errors::{SyncError, SyncResult};
use crate::types::{AchievementId, ScreenKey};

const SCREEN_FILE_SUFFIX: &str = ".tsx";

/// The resolved award for one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardRule {
    pub points: u32,
    pub achievement_id: Option<AchievementId>,
    pub mode: AwardMode,
}

struct CompiledPattern {
    regex: Regex,
    config: PatternAwardConfig,
}

/// Compiled award table. Built once from [`AwardsConfig`].
pub struct AwardCatalog {
    screens: BTreeMap<String, ScreenAwardConfig>,
    patterns: Vec<CompiledPattern>,
}

impl AwardCatalog {
    pub fn from_config(config: &AwardsConfig) -> SyncResult<Self> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| {
                let regex = RegexBuilder::new(&p.pattern)
                    .case_insensitive(p.case_insensitive)
                    .build()
                    .map_err(|e| {
                        SyncError::Configuration(format!(
                            "awards pattern '{}' does not compile: {}",
                            p.pattern, e
                        ))
                    })?;
                Ok(CompiledPattern {
                    regex,
                    config: p.clone(),
                })
            })
            .collect::<SyncResult<Vec<_>>>()?;

        Ok(Self {
            screens: config.screens.clone(),
            patterns,
        })
    }

    /// An empty catalog: every lookup misses.
    pub fn empty() -> Self {
        Self {
            screens: BTreeMap::new(),
            patterns: Vec::new(),
        }
    }

    pub fn resolve(&self, screen_key: &ScreenKey) -> Option<AwardRule> {
        let key = screen_key.as_str();

        let exact = self
            .screens
            .get(key)
            .or_else(|| self.screens.get(&format!("{key}{SCREEN_FILE_SUFFIX}")));
        if let Some(cfg) = exact {
            return Some(AwardRule {
                points: cfg.points,
                achievement_id: cfg.achievement_id.as_deref().map(AchievementId::from),
                mode: cfg.mode,
            });
        }

        let stem = key.strip_suffix(SCREEN_FILE_SUFFIX).unwrap_or(key);
        self.patterns
            .iter()
            .find(|p| p.regex.is_match(key))
            .map(|p| AwardRule {
                points: p.config.points,
                achievement_id: p
                    .config
                    .achievement_prefix
                    .as_ref()
                    .map(|prefix| AchievementId::new(format!("{prefix}_{stem}").to_lowercase())),
                mode: p.config.mode,
            })
    }

    pub fn mode_for(&self, screen_key: &ScreenKey) -> Option<AwardMode> {
        self.resolve(screen_key).map(|r| r.mode)
    }

    pub fn len(&self) -> usize {
        self.screens.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
