use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use minishift_core::MachineConfig;
use tracing::debug;

use crate::fs_utils::write_file_if_absent;
use crate::{AllInstancesStore, InstanceDirs, ProfileLayout};

/// State produced by materializing a profile on disk.
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    /// Captured before the add-ons directory was created.
    pub addons_install_required: bool,
    pub all_instances: AllInstancesStore,
    pub machine: MachineConfig,
}

/// Creates the profile tree and its JSON state files. Safe to run on every
/// invocation: existing directories and files are left untouched.
///
/// A store already loaded during profile resolution is reused instead of
/// reading the file a second time.
pub fn bootstrap_profile(
    layout: &ProfileLayout,
    loaded_store: Option<AllInstancesStore>,
) -> Result<BootstrapOutcome> {
    let addons_install_required = !layout.addons_dir().exists();

    ensure_instance_dirs(&layout.instance_dirs())?;

    let all_instances = match loaded_store {
        Some(store) => store,
        None => {
            let path = layout.all_instances_config_path();
            ensure_parent_dir(&path)?;
            AllInstancesStore::open_or_create(path)
                .context("Error creating all instance config")?
        }
    };

    ensure_config_file_exists(&layout.config_file_path())?;

    let machine = load_or_create_machine_config(&layout.machine_config_path())
        .context("Error creating config for VM")?;

    Ok(BootstrapOutcome {
        addons_install_required,
        all_instances,
        machine,
    })
}

pub fn ensure_instance_dirs(dirs: &InstanceDirs) -> Result<()> {
    for (name, dir) in dirs.entries() {
        if dir.is_dir() {
            continue;
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("Error creating directory: {}", dir.display()))?;
        debug!(name, path = %dir.display(), "created instance directory");
    }
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Error creating directory: {}", parent.display()))
}

/// Seeds the profile config with an empty JSON object.
pub fn ensure_config_file_exists(path: &Path) -> Result<()> {
    if write_file_if_absent(path, b"{}")
        .with_context(|| format!("Cannot create file '{}'", path.display()))?
    {
        debug!(path = %path.display(), "created profile config");
    }
    Ok(())
}

pub fn load_or_create_machine_config(path: &Path) -> Result<MachineConfig> {
    if !path.exists() {
        let machine = MachineConfig::default();
        fs::write(path, machine.to_json_string()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        return Ok(machine);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    MachineConfig::from_json_str(&content)
        .with_context(|| format!("invalid machine config: {}", path.display()))
}
