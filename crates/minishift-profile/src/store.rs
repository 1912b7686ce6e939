use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minishift_core::{AllInstancesConfig, ProfileName};
use tracing::debug;

use crate::fs_utils::write_file_if_absent;

/// The all-instances config bound to its backing file.
///
/// Every mutation is persisted before it returns, so later steps of the same
/// invocation and future invocations observe the same state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllInstancesStore {
    path: PathBuf,
    config: AllInstancesConfig,
}

impl AllInstancesStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = AllInstancesConfig::from_json_str(&content)
            .with_context(|| format!("invalid all instances config: {}", path.display()))?;
        Ok(Self { path, config })
    }

    pub fn load_if_present(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Creates the backing file with an empty document when absent, then loads it.
    /// The parent directory must already exist.
    pub fn open_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let initial = AllInstancesConfig::default().to_json_string()?;
        if write_file_if_absent(&path, initial.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?
        {
            debug!(path = %path.display(), "created all instances config");
        }
        Self::load(path)
    }

    pub fn active_profile(&self) -> Option<&str> {
        self.config.active_profile()
    }

    pub fn is_active(&self, profile: &ProfileName) -> bool {
        self.active_profile() == Some(profile.as_str())
    }

    pub fn set_active_profile(&mut self, profile: &ProfileName) -> Result<()> {
        self.config.active_profile = profile.as_str().to_string();
        self.save()
    }

    fn save(&self) -> Result<()> {
        let rendered = self.config.to_json_string()?;
        fs::write(&self.path, rendered)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}
