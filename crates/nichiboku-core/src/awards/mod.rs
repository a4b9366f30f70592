//! Screen award catalog.
//!
//! Maps a screen key to the XP and achievement it earns, and to the moment it
//! is earned (on entering the screen or on completing it). Exact keys win over
//! patterns; patterns are tried in configuration order.

mod catalog;

use serde::{Deserialize, Serialize};

pub use catalog::{AwardCatalog, AwardRule};

/// When a catalog award is earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardMode {
    OnEnter,
    OnSuccess,
}

impl AwardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnEnter => "on_enter",
            Self::OnSuccess => "on_success",
        }
    }
}
