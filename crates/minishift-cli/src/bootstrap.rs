use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::ArgMatches;
use minishift_config::{
    merge_config, sync_allowlisted_flags, ConfigDocument, EffectiveConfig, FlagSet,
    LOGGING_FLAG_ALLOWLIST,
};
use minishift_core::{BuildInfo, MachineConfig, ProfileName, ENV_PREFIX};
use minishift_profile::{
    bootstrap_profile, ensure_default_active, run_post_upgrade, validate_requested_profile,
    AddonInstaller, AllInstancesStore, ClusterContext, PostUpgradeReport, ProfileLayout,
};
use tracing::{debug, info};

use crate::args::ResolvedProfile;
use crate::GlobalArgs;

pub(crate) const SHOW_LIBMACHINE_LOGS_FLAG: &str = "show-libmachine-logs";
pub(crate) const PROFILE_FLAG: &str = "profile";

/// Process-level inputs gathered before clap parsed the arguments.
pub(crate) struct Session<'a> {
    pub(crate) root: PathBuf,
    pub(crate) resolved: ResolvedProfile,
    pub(crate) enable_experimental: bool,
    pub(crate) env_lookup: &'a dyn Fn(&str) -> Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoggingOptions {
    pub(crate) verbosity: u8,
    pub(crate) also_log_to_stderr: bool,
    pub(crate) log_dir: PathBuf,
}

/// Profile and configuration resolved, nothing written to disk yet.
#[derive(Debug)]
pub(crate) struct PreparedInvocation {
    pub(crate) layout: ProfileLayout,
    pub(crate) config: EffectiveConfig,
    pub(crate) logging: LoggingOptions,
    pub(crate) enable_experimental: bool,
    pub(crate) show_libmachine_logs: bool,
    /// Recoverable problems to report once logging is up.
    pub(crate) warnings: Vec<String>,
    loaded_store: Option<AllInstancesStore>,
}

pub(crate) struct Collaborators<'a> {
    pub(crate) addons: &'a dyn AddonInstaller,
    pub(crate) cluster: &'a dyn ClusterContext,
    pub(crate) build: BuildInfo,
}

/// Everything later command logic reads; built once per invocation.
#[derive(Debug)]
pub(crate) struct BootstrapContext {
    pub(crate) layout: ProfileLayout,
    pub(crate) config: EffectiveConfig,
    pub(crate) logging: LoggingOptions,
    pub(crate) all_instances: AllInstancesStore,
    pub(crate) machine: MachineConfig,
    pub(crate) enable_experimental: bool,
    pub(crate) show_libmachine_logs: bool,
    pub(crate) installed_default_addons: Option<Vec<String>>,
    pub(crate) post_upgrade: Option<PostUpgradeReport>,
}

/// Derives the profile layout and the effective configuration.
pub(crate) fn prepare_invocation(
    session: Session<'_>,
    global: &GlobalArgs,
    matches: &ArgMatches,
) -> Result<PreparedInvocation> {
    let profile = ProfileName::from_resolved(&session.resolved.name)?;
    let layout = ProfileLayout::new(&session.root, profile);

    let mut flags = collect_flag_set(global, matches, &layout)?;
    let (document, config_warning) = ConfigDocument::load_lenient(&layout.config_file_path());
    let mut config = merge_config(&flags, &document, ENV_PREFIX, session.env_lookup);
    sync_allowlisted_flags(&mut flags, &mut config, &LOGGING_FLAG_ALLOWLIST)?;

    let mut warnings: Vec<String> = config_warning.into_iter().collect();
    let logging = logging_options(&config, &layout, &mut warnings);
    let show_libmachine_logs =
        or_default(config.get_bool(SHOW_LIBMACHINE_LOGS_FLAG), false, &mut warnings);

    Ok(PreparedInvocation {
        layout,
        config,
        logging,
        enable_experimental: session.enable_experimental,
        show_libmachine_logs,
        warnings,
        loaded_store: session.resolved.store,
    })
}

/// Validates the profile, materializes it and runs pending one-shot work.
pub(crate) fn bootstrap_invocation(
    prepared: PreparedInvocation,
    creates_profile: bool,
    collaborators: &Collaborators<'_>,
) -> Result<BootstrapContext> {
    let PreparedInvocation {
        layout,
        config,
        logging,
        enable_experimental,
        show_libmachine_logs,
        warnings: _,
        loaded_store,
    } = prepared;

    // Must run before any directory exists for the profile, or the existence
    // check would always pass.
    validate_requested_profile(layout.root(), layout.profile().as_str(), creates_profile)?;

    let outcome = bootstrap_profile(&layout, loaded_store)?;
    let mut all_instances = outcome.all_instances;

    let installed_default_addons = if outcome.addons_install_required {
        let installed = collaborators
            .addons
            .unpack_default_addons(&layout.addons_dir())
            .context("Error installing default add-ons ")?;
        debug!(addons = ?installed, "installed default add-ons");
        Some(installed)
    } else {
        None
    };

    let post_upgrade = run_post_upgrade(
        &layout.update_marker_path(),
        &layout.addons_dir(),
        collaborators.addons,
        &collaborators.build,
    )
    .context("Error in performing post update execution")?;

    if enable_experimental {
        info!("Experimental features are enabled");
    }
    debug!(show_libmachine_logs, "libmachine log output");

    ensure_default_active(&mut all_instances, layout.profile(), collaborators.cluster)?;

    Ok(BootstrapContext {
        layout,
        config,
        logging,
        all_instances,
        machine: outcome.machine,
        enable_experimental,
        show_libmachine_logs,
        installed_default_addons,
        post_upgrade,
    })
}

/// Registers every root flag with its default and records the ones the user
/// passed explicitly. Global flags are checked on the top-level matches, which
/// clap fills in from whichever subcommand level they were given at.
pub(crate) fn collect_flag_set(
    global: &GlobalArgs,
    matches: &ArgMatches,
    layout: &ProfileLayout,
) -> Result<FlagSet> {
    let mut flags = FlagSet::new();
    flags.register(SHOW_LIBMACHINE_LOGS_FLAG, "false");
    flags.register(PROFILE_FLAG, ProfileName::default_profile().as_str());
    flags.register("v", "0");
    flags.register("alsologtostderr", "false");
    flags.register("log_dir", layout.default_log_dir().display().to_string());

    if from_command_line(matches, "show_libmachine_logs") {
        flags.set_from_command_line(
            SHOW_LIBMACHINE_LOGS_FLAG,
            global.show_libmachine_logs.to_string(),
        )?;
    }
    if from_command_line(matches, "profile") {
        flags.set_from_command_line(PROFILE_FLAG, global.profile.clone())?;
    }
    if from_command_line(matches, "verbosity") {
        flags.set_from_command_line("v", global.verbosity.to_string())?;
    }
    if from_command_line(matches, "alsologtostderr") {
        flags.set_from_command_line("alsologtostderr", global.alsologtostderr.to_string())?;
    }
    if let Some(dir) = global
        .log_dir
        .as_ref()
        .filter(|_| from_command_line(matches, "log_dir"))
    {
        flags.set_from_command_line("log_dir", dir.clone())?;
    }

    Ok(flags)
}

fn from_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Reads the synchronized logging keys. Values that do not parse fall back
/// to the registered defaults and are reported as warnings.
fn logging_options(
    config: &EffectiveConfig,
    layout: &ProfileLayout,
    warnings: &mut Vec<String>,
) -> LoggingOptions {
    let verbosity = or_default(config.get_u8("v"), 0, warnings);
    let also_log_to_stderr = or_default(config.get_bool("alsologtostderr"), false, warnings);
    let log_dir = config
        .get_string("log_dir")
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| layout.default_log_dir());

    LoggingOptions {
        verbosity,
        also_log_to_stderr,
        log_dir,
    }
}

fn or_default<T: fmt::Display>(
    parsed: Result<Option<T>>,
    default: T,
    warnings: &mut Vec<String>,
) -> T {
    match parsed {
        Ok(value) => value.unwrap_or(default),
        Err(err) => {
            warnings.push(format!("{err:#}, using default '{default}'"));
            default
        }
    }
}
