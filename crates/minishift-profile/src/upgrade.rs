use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use minishift_core::{BuildInfo, UpdateMarker};
use tracing::warn;

use crate::AddonInstaller;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpgradeReport {
    pub previous_version: String,
    pub current_version: String,
    pub addons: Option<AddonRefresh>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonRefresh {
    Installed(Vec<String>),
    Failed(String),
}

/// Performs the one-shot maintenance requested by `minishift update`.
///
/// Returns `None` when no marker is present. The marker is removed whatever
/// the marker asked for; failing to remove it is an error because it would
/// trigger the same maintenance on every later invocation.
pub fn run_post_upgrade(
    marker_path: &Path,
    addons_dir: &Path,
    installer: &dyn AddonInstaller,
    build: &BuildInfo,
) -> Result<Option<PostUpgradeReport>> {
    if !marker_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(marker_path)
        .with_context(|| format!("failed to read {}", marker_path.display()))?;
    let (marker, parse_warning) = UpdateMarker::parse_lenient(&content);
    if let Some(parse_warning) = parse_warning {
        warn!(
            "ignoring malformed update marker '{}': {parse_warning}",
            marker_path.display()
        );
    }
    if build.is_downgrade_from(&marker.previous_version) {
        warn!(
            "running v{} after an update from newer v{}",
            build.version, marker.previous_version
        );
    }

    let addons = if marker.install_addon {
        Some(match installer.unpack_default_addons(addons_dir) {
            Ok(installed) => AddonRefresh::Installed(installed),
            Err(err) => {
                warn!("failed to update default add-ons: {err:#}");
                AddonRefresh::Failed(format!("{err:#}"))
            }
        })
    } else {
        None
    };

    fs::remove_file(marker_path)
        .with_context(|| format!("failed to remove {}", marker_path.display()))?;

    Ok(Some(PostUpgradeReport {
        previous_version: marker.previous_version,
        current_version: build.version.clone(),
        addons,
    }))
}
