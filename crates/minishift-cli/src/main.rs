use anyhow::{Context, Result};
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use minishift_core::{parse_bool_env, DEFAULT_PROFILE_NAME};
use minishift_profile::{all_instances_config_path, default_minishift_home};

mod args;
mod bootstrap;
mod collaborators;
mod completion;
mod dispatch;
mod logging;
mod render;

use crate::args::resolve_profile_name;
use crate::bootstrap::Session;
use crate::dispatch::run_cli;

const ENABLE_EXPERIMENTAL_ENV: &str = "MINISHIFT_ENABLE_EXPERIMENTAL";

#[derive(Parser, Debug)]
#[command(name = "minishift")]
#[command(
    about = "Minishift is a tool for application development in local OpenShift clusters.",
    long_about = "Minishift is a command-line tool that provisions and manages single-node OpenShift clusters optimized for development workflows."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command. Their values are merged with the
/// environment and the profile config before use.
#[derive(Args, Debug)]
struct GlobalArgs {
    /// Profile name
    #[arg(long, global = true, default_value = DEFAULT_PROFILE_NAME)]
    profile: String,
    /// Show logs from libmachine.
    #[arg(long = "show-libmachine-logs", global = true)]
    show_libmachine_logs: bool,
    /// Log level for verbose output.
    #[arg(short = 'v', long = "v", global = true, default_value_t = 0)]
    verbosity: u8,
    /// Log to standard error as well as to the log file.
    #[arg(long = "alsologtostderr", global = true)]
    alsologtostderr: bool,
    /// Directory for log files.
    #[arg(long = "log_dir", global = true)]
    log_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prepares the profile and makes it the active one.
    Start,
    /// Shows the layout and state of the current profile.
    Status,
    /// Manages profiles.
    #[command(visible_alias = "profiles", visible_alias = "instance")]
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Modifies the persistent configuration of the current profile.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Prints the version.
    Version,
    /// Outputs a shell completion script.
    Completion {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    Set { name: String },
    List,
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
    Unset { key: String },
    View,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum CliCompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Commands {
    /// `version` and `completion` must work without materializing a home directory.
    fn skips_bootstrap(&self) -> bool {
        matches!(self, Self::Version | Self::Completion { .. })
    }

    /// Commands allowed to target a profile that does not exist yet.
    fn may_create_profile(&self) -> bool {
        matches!(self, Self::Start | Self::Profile { .. })
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let env_lookup = |key: &str| std::env::var(key).ok();
    if let Err(err) = run(args, &env_lookup) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

/// Profile resolution scans the raw arguments before clap runs: the profile
/// decides which config file seeds the flag defaults, so it has to be known
/// before any flag binding is final.
fn run(args: Vec<String>, env_lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
    let enable_experimental = parse_bool_env(ENABLE_EXPERIMENTAL_ENV, env_lookup)
        .context("Error enabling experimental features")?;
    let root = default_minishift_home(env_lookup)?;
    let resolved = resolve_profile_name(&args, &all_instances_config_path(&root))?;

    let matches = parse_matches(&args);
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let session = Session {
        root,
        resolved,
        enable_experimental,
        env_lookup,
    };
    run_cli(cli, &matches, session)
}

fn parse_matches(args: &[String]) -> ArgMatches {
    Cli::command()
        .try_get_matches_from(args)
        .unwrap_or_else(|err| err.exit())
}
