mod all_instances;
mod boolean;
mod machine;
mod marker;
mod profile;
mod version;

pub use all_instances::AllInstancesConfig;
pub use boolean::{parse_bool, parse_bool_env};
pub use machine::MachineConfig;
pub use marker::{UpdateMarker, UPDATE_MARKER_FILE_NAME};
pub use profile::{
    is_valid_profile_name, ProfileName, BINARY_NAME, DEFAULT_PROFILE_NAME, ENV_PREFIX,
    INVALID_PROFILE_NAME,
};
pub use version::BuildInfo;
