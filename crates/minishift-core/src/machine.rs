use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-instance machine state stored at `machines/<name>.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MachineConfig {
    #[serde(rename = "OcPath", default)]
    pub oc_path: String,
    #[serde(rename = "IsRHELBased", default)]
    pub is_rhel_based: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MachineConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(content).context("failed to parse machine config")
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize machine config")
    }
}
