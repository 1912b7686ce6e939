use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::bootstrap::LoggingOptions;

pub(crate) const LOG_FILE_NAME: &str = "minishift.log";

pub(crate) fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 | 2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber: always the log file in `log_dir`, plus
/// stderr with `--alsologtostderr`. `RUST_LOG` overrides the verbosity.
pub(crate) fn init_logging(options: &LoggingOptions) -> Result<()> {
    fs::create_dir_all(&options.log_dir)
        .with_context(|| format!("Error creating directory: {}", options.log_dir.display()))?;
    let log_path = options.log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(options.verbosity)));
    let stderr_layer = options
        .also_log_to_stderr
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(stderr_layer)
        .try_init()
        .context("failed to initialize logging")
}
