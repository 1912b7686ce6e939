mod bootstrap;
mod collaborators;
mod fs_utils;
mod guard;
mod layout;
mod profiles;
mod store;
mod upgrade;

pub use bootstrap::{
    bootstrap_profile, ensure_config_file_exists, ensure_instance_dirs, ensure_parent_dir,
    load_or_create_machine_config, BootstrapOutcome,
};
pub use collaborators::{AddonInstaller, ClusterContext};
pub use guard::{ensure_default_active, profile_exists, validate_requested_profile};
pub use layout::{
    all_instances_config_path, default_minishift_home, profile_home_dir, profiles_dir,
    InstanceDirs, ProfileLayout,
};
pub use profiles::{list_profiles, remove_profile};
pub use store::AllInstancesStore;
pub use upgrade::{run_post_upgrade, AddonRefresh, PostUpgradeReport};

#[cfg(test)]
mod tests;
