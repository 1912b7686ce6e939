use std::path::Path;

use anyhow::Result;
use minishift_core::{
    is_valid_profile_name, ProfileName, DEFAULT_PROFILE_NAME, INVALID_PROFILE_NAME,
};
use tracing::{info, warn};

use crate::layout::profiles_dir;
use crate::{AllInstancesStore, ClusterContext};

/// Checks the requested profile before anything is written for it.
///
/// `creates_profile` is set for the commands that are allowed to bring a new
/// profile into existence (`start` and the `profile` subcommands).
pub fn validate_requested_profile(
    root: &Path,
    requested: &str,
    creates_profile: bool,
) -> Result<ProfileName> {
    if requested == DEFAULT_PROFILE_NAME {
        return Ok(ProfileName::default_profile());
    }
    if !is_valid_profile_name(requested) {
        anyhow::bail!(INVALID_PROFILE_NAME);
    }

    let profile = ProfileName::parse(requested)?;
    if !creates_profile && !profile_exists(root, &profile) {
        anyhow::bail!(
            "Profile '{name}' doesn't exist, Use 'minishift profile set {name}' or 'minishift start --profile {name}' to create",
            name = profile
        );
    }
    Ok(profile)
}

pub fn profile_exists(root: &Path, profile: &ProfileName) -> bool {
    profile.is_default() || profiles_dir(root).join(profile.as_str()).is_dir()
}

/// Marks the default profile active when nothing is active yet.
///
/// Returns whether the store was changed. The cluster context is only switched
/// when the invocation itself targets the default profile; otherwise a run
/// against some other profile would steal the user's current context.
pub fn ensure_default_active(
    store: &mut AllInstancesStore,
    requested: &ProfileName,
    cluster: &dyn ClusterContext,
) -> Result<bool> {
    if store.active_profile().is_some() {
        return Ok(false);
    }

    let default = ProfileName::default_profile();
    store.set_active_profile(&default)?;
    info!(profile = %default, "no active profile recorded, defaulting");

    if requested.is_default() {
        if let Err(err) = cluster.use_profile(&default) {
            warn!("failed to switch cluster context to '{default}': {err:#}");
        }
    }
    Ok(true)
}
