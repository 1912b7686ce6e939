use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Process-wide record of which profile is active across invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllInstancesConfig {
    #[serde(rename = "ActiveProfile", alias = "activeProfile", default)]
    pub active_profile: String,
}

impl AllInstancesConfig {
    /// Blank content is treated as a fresh document; anything else must be
    /// valid JSON of the expected shape.
    pub fn from_json_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(content).context("failed to parse all instances config")
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize all instances config")
    }

    pub fn active_profile(&self) -> Option<&str> {
        if self.active_profile.is_empty() {
            None
        } else {
            Some(&self.active_profile)
        }
    }
}
