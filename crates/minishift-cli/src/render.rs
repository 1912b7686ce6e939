use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use minishift_config::EffectiveConfig;
use minishift_core::ProfileName;
use minishift_profile::{AddonRefresh, PostUpgradeReport};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    let no_color = std::env::var_os("NO_COLOR").is_some();
    if std::io::stdout().is_terminal() && !no_color {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let badge = format!("[{}]", status.to_ascii_uppercase());
            format!("{} {message}", colorize(status_style(status), &badge))
        }
    }
}

pub(crate) fn format_post_upgrade_lines(
    report: &PostUpgradeReport,
    style: OutputStyle,
) -> Vec<String> {
    let Some(addons) = &report.addons else {
        return Vec::new();
    };

    let mut lines = vec![format!(
        "Minishift was upgraded from v{} to v{}. Running post update actions.",
        report.previous_version, report.current_version
    )];
    match addons {
        AddonRefresh::Installed(names) => {
            lines.push(render_status_line(
                style,
                "ok",
                "--- Updating default add-ons ... OK",
            ));
            lines.push(format!(
                "Default add-ons '{}' installed",
                names.join(", ")
            ));
        }
        AddonRefresh::Failed(reason) => {
            lines.push(render_status_line(
                style,
                "warn",
                &format!("--- Updating default add-ons ... FAILED ({reason})"),
            ));
        }
    }
    lines
}

pub(crate) fn format_profile_list_lines(
    profiles: &[ProfileName],
    active: Option<&str>,
    style: OutputStyle,
) -> Vec<String> {
    profiles
        .iter()
        .map(|profile| {
            if active == Some(profile.as_str()) {
                render_status_line(style, "active", &format!("- {profile}\t(Active)"))
            } else {
                format!("- {profile}")
            }
        })
        .collect()
}

pub(crate) fn format_config_view_lines(config: &EffectiveConfig) -> Vec<String> {
    config
        .iter()
        .map(|(key, entry)| {
            let value = match &entry.value {
                serde_json::Value::String(value) => value.clone(),
                other => other.to_string(),
            };
            format!("- {key:<24}: {value} ({})", entry.source)
        })
        .collect()
}

/// Unknown keys print `<nil>`, which existing scripts compare against.
pub(crate) fn format_config_get_line(config: &EffectiveConfig, key: &str) -> String {
    config
        .get_string(key)
        .unwrap_or_else(|| "<nil>".to_string())
}

pub(crate) fn format_key_value_lines(rows: &[(&str, String)]) -> Vec<String> {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value)| format!("{key:<width$}  {value}"))
        .collect()
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "ok" | "active" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        _ => AnsiColor::BrightBlue,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
