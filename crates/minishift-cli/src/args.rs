use std::path::Path;

use anyhow::{Context, Result};
use minishift_profile::AllInstancesStore;

const PROFILE_COMMAND: &str = "profile";
const PROFILE_COMMAND_ALIASES: [&str; 2] = ["profiles", "instance"];
const PROFILE_SET_COMMAND: &str = "set";
const PROFILE_FLAG: &str = "--profile";

/// Outcome of the raw-argument pre-pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedProfile {
    /// Empty when neither the arguments nor the persisted state name one.
    pub(crate) name: String,
    /// The all-instances store, when its file already existed.
    pub(crate) store: Option<AllInstancesStore>,
}

/// Decides which profile governs this invocation:
///
/// 1. `profile set <name>` (or an alias) wins, even over `--profile`.
/// 2. `--profile <name>`, only when no profile command token appears anywhere.
/// 3. The active profile recorded in the all-instances config.
/// 4. Otherwise empty, and the caller falls back to the default profile.
///
/// A malformed all-instances file is fatal even when the arguments already
/// named a profile.
pub(crate) fn resolve_profile_name(
    args: &[String],
    all_instances_path: &Path,
) -> Result<ResolvedProfile> {
    let requested = profile_override_from_args(args).filter(|name| !name.is_empty());

    let store = AllInstancesStore::load_if_present(all_instances_path)
        .context("Error initializing all instance config")?;
    let active = store
        .as_ref()
        .and_then(|store| store.active_profile())
        .map(str::to_string);

    Ok(ResolvedProfile {
        name: requested.or(active).unwrap_or_default(),
        store,
    })
}

/// Textual scan for a profile named on the command line.
///
/// The `--profile` flag is ignored whenever a profile command token appears,
/// regardless of position.
pub(crate) fn profile_override_from_args(args: &[String]) -> Option<String> {
    let profile_command_used = args.iter().any(|arg| is_profile_command(arg));

    for (index, arg) in args.iter().enumerate() {
        if !profile_command_used {
            if arg == PROFILE_FLAG {
                return args.get(index + 1).cloned();
            }
            if let Some(value) = arg.strip_prefix("--profile=") {
                return Some(value.to_string());
            }
        }

        if is_profile_command(arg) {
            // `profile` with no subcommand and name yields no override
            let (Some(subcommand), Some(name)) = (args.get(index + 1), args.get(index + 2)) else {
                return None;
            };
            if subcommand == PROFILE_SET_COMMAND {
                return Some(name.clone());
            }
            return None;
        }
    }

    None
}

fn is_profile_command(arg: &str) -> bool {
    arg == PROFILE_COMMAND || PROFILE_COMMAND_ALIASES.contains(&arg)
}
