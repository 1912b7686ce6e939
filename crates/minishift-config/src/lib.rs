mod document;
mod flags;
mod merge;

pub use document::ConfigDocument;
pub use flags::{FlagSet, FlagValue};
pub use merge::{
    env_key, merge_config, sync_allowlisted_flags, ConfigSource, ConfigValue, EffectiveConfig,
    LOGGING_FLAG_ALLOWLIST,
};
