use std::path::Path;

use anyhow::Result;
use minishift_core::ProfileName;

/// Unpacks the bundled default add-ons.
pub trait AddonInstaller {
    /// Returns the names of the add-ons written into `target_dir`.
    fn unpack_default_addons(&self, target_dir: &Path) -> Result<Vec<String>>;
}

/// Points external cluster tooling (the `oc` client's current context) at a profile.
pub trait ClusterContext {
    fn use_profile(&self, profile: &ProfileName) -> Result<()>;
}
