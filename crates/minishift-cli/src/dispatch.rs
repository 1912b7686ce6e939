use anyhow::Result;
use clap::ArgMatches;
use minishift_config::ConfigDocument;
use minishift_core::{BuildInfo, ProfileName, BINARY_NAME};
use minishift_profile::{list_profiles, remove_profile};
use tracing::warn;

use crate::bootstrap::{
    bootstrap_invocation, prepare_invocation, BootstrapContext, Collaborators, Session,
};
use crate::collaborators::{BundledAddons, OcClusterContext, SpinnerAddonInstaller};
use crate::completion::write_completions_script;
use crate::logging::init_logging;
use crate::render::{
    current_output_style, format_config_get_line, format_config_view_lines,
    format_key_value_lines, format_post_upgrade_lines, format_profile_list_lines, print_lines,
    render_status_line, OutputStyle,
};
use crate::{Cli, Commands, ConfigCommands, ProfileCommands};

pub(crate) fn run_cli(cli: Cli, matches: &ArgMatches, session: Session<'_>) -> Result<()> {
    let build = BuildInfo::current();

    if cli.command.skips_bootstrap() {
        match cli.command {
            Commands::Version => println!("{BINARY_NAME} {}", build.display_version()),
            Commands::Completion { shell } => {
                let mut stdout = std::io::stdout();
                write_completions_script(shell, &mut stdout)?;
            }
            _ => {}
        }
        return Ok(());
    }

    let style = current_output_style();
    let prepared = prepare_invocation(session, &cli.global, matches)?;
    init_logging(&prepared.logging)?;
    for warning in &prepared.warnings {
        warn!("{warning}");
    }

    let bundled = BundledAddons;
    let addons = SpinnerAddonInstaller {
        inner: &bundled,
        style,
    };
    let cluster = OcClusterContext {
        oc_cache_dir: prepared.layout.oc_cache_dir(),
    };
    let collaborators = Collaborators {
        addons: &addons,
        cluster: &cluster,
        build: build.clone(),
    };
    let mut context =
        bootstrap_invocation(prepared, cli.command.may_create_profile(), &collaborators)?;

    if context.installed_default_addons.is_some() {
        println!(
            "{}",
            render_status_line(style, "ok", "-- Installing default add-ons ... OK")
        );
    }
    if let Some(report) = &context.post_upgrade {
        print_lines(&format_post_upgrade_lines(report, style));
    }
    if context.logging.verbosity >= 2 {
        println!("-- minishift version: {}", build.display_version());
    }

    run_command(cli.command, &mut context, style)
}

fn run_command(
    command: Commands,
    context: &mut BootstrapContext,
    style: OutputStyle,
) -> Result<()> {
    match command {
        Commands::Start => {
            let profile = context.layout.profile().clone();
            context.all_instances.set_active_profile(&profile)?;
            println!(
                "{}",
                render_status_line(
                    style,
                    "ok",
                    &format!(
                        "Profile '{profile}' is ready at {}",
                        context.layout.home().display()
                    ),
                )
            );
        }
        Commands::Status => print_lines(&format_key_value_lines(&status_rows(context))),
        Commands::Profile { command } => run_profile_command(command, context, style)?,
        Commands::Config { command } => run_config_command(command, context)?,
        Commands::Version | Commands::Completion { .. } => {}
    }
    Ok(())
}

fn run_profile_command(
    command: ProfileCommands,
    context: &mut BootstrapContext,
    style: OutputStyle,
) -> Result<()> {
    match command {
        ProfileCommands::Set { name } => {
            let profile = ProfileName::parse(&name)?;
            context.all_instances.set_active_profile(&profile)?;
            println!(
                "{}",
                render_status_line(
                    style,
                    "ok",
                    &format!("Profile '{profile}' set as active profile."),
                )
            );
        }
        ProfileCommands::List => {
            let profiles = list_profiles(context.layout.root())?;
            print_lines(&format_profile_list_lines(
                &profiles,
                context.all_instances.active_profile(),
                style,
            ));
        }
        ProfileCommands::Delete { name } => {
            let profile = ProfileName::parse(&name)?;
            remove_profile(context.layout.root(), &profile, &mut context.all_instances)?;
            println!(
                "{}",
                render_status_line(style, "ok", &format!("Deleted profile '{profile}'."))
            );
        }
    }
    Ok(())
}

pub(crate) fn run_config_command(
    command: ConfigCommands,
    context: &BootstrapContext,
) -> Result<()> {
    let path = context.layout.config_file_path();
    match command {
        ConfigCommands::Set { key, value } => {
            let mut document = ConfigDocument::load_for_edit(&path)?;
            document.set(&key, &value);
            document.save(&path)?;
        }
        ConfigCommands::Get { key } => {
            println!("{}", format_config_get_line(&context.config, &key));
        }
        ConfigCommands::Unset { key } => {
            let mut document = ConfigDocument::load_for_edit(&path)?;
            if document.unset(&key) {
                document.save(&path)?;
            }
        }
        ConfigCommands::View => print_lines(&format_config_view_lines(&context.config)),
    }
    Ok(())
}

fn status_rows(context: &BootstrapContext) -> Vec<(&'static str, String)> {
    let layout = &context.layout;
    let active = context.all_instances.is_active(layout.profile());
    let oc_path = if context.machine.oc_path.is_empty() {
        "not cached".to_string()
    } else {
        context.machine.oc_path.clone()
    };
    vec![
        ("Profile:", layout.profile().to_string()),
        ("Active:", label(active, "yes", "no")),
        ("Home:", layout.home().display().to_string()),
        ("Config:", layout.config_file_path().display().to_string()),
        ("Machine config:", layout.machine_config_path().display().to_string()),
        ("Kubeconfig:", layout.kubeconfig_path().display().to_string()),
        ("OpenShift client:", oc_path),
        ("Log dir:", context.logging.log_dir.display().to_string()),
        (
            "Experimental:",
            label(context.enable_experimental, "enabled", "disabled"),
        ),
        (
            "Libmachine logs:",
            label(context.show_libmachine_logs, "shown", "hidden"),
        ),
    ]
}

fn label(value: bool, on: &str, off: &str) -> String {
    let text = if value { on } else { off };
    text.to_string()
}
