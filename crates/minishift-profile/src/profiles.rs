use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use minishift_core::{is_valid_profile_name, ProfileName};

use crate::layout::{profile_home_dir, profiles_dir};
use crate::AllInstancesStore;

/// The default profile followed by every named profile directory, sorted.
pub fn list_profiles(root: &Path) -> Result<Vec<ProfileName>> {
    let mut profiles = vec![ProfileName::default_profile()];
    let dir = profiles_dir(root);
    if !dir.exists() {
        return Ok(profiles);
    }

    let mut named = Vec::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read profiles directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !is_valid_profile_name(&name) {
            continue;
        }
        named.push(ProfileName::parse(&name)?);
    }
    named.sort();
    profiles.extend(named);
    Ok(profiles)
}

/// Deletes a named profile's home. When it was the active profile, the
/// default profile becomes active.
pub fn remove_profile(
    root: &Path,
    profile: &ProfileName,
    store: &mut AllInstancesStore,
) -> Result<()> {
    if profile.is_default() {
        anyhow::bail!("Default profile '{profile}' can not be deleted");
    }

    let home = profile_home_dir(root, profile);
    if !home.is_dir() {
        anyhow::bail!("Error: '{profile}' is not a valid profile");
    }
    fs::remove_dir_all(&home)
        .with_context(|| format!("failed to remove {}", home.display()))?;

    if store.is_active(profile) {
        store.set_active_profile(&ProfileName::default_profile())?;
    }
    Ok(())
}
