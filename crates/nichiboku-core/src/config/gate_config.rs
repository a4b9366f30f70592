//! Access gate presentation settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Navigation target offered on the blocked screen.
    pub upgrade_route: String,
    /// Text shown while the entitlement is still loading.
    pub loading_message: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            upgrade_route: "Pagos".to_string(),
            loading_message: "Loading your plan...".to_string(),
        }
    }
}
