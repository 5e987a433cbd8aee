//! Logging for the `mobile-seg` CLI.
//!
//! Events go to stderr so stdout carries nothing but parameter output.
//! The verbosity flags apply to this workspace's crates only; dependencies
//! stay at `warn`. Each run is wrapped in a `run` span that names the
//! command and the parameter files it reads, so every event carries that
//! context in both output formats.

use clap::ValueEnum;
use std::io::IsTerminal;
use tracing::Span;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{ColorChoice, Commands};

/// Environment variable holding a full `EnvFilter` directive.
pub const LOG_LEVEL_ENV: &str = "MOBILE_SEG_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Compact lines without timestamps, colored on a terminal.
    #[default]
    Human,
    /// Newline-delimited JSON including the `run` span fields.
    Json,
}

/// Level this workspace logs at for a verbosity count.
///
/// `--quiet` wins over any number of `-v`.
#[must_use]
pub const fn level_for(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter directive: dependencies at `warn`, this workspace at `level`.
#[must_use]
pub fn filter_directive(verbosity: u8, quiet: bool) -> String {
    let level = level_for(verbosity, quiet);
    if quiet {
        return level.to_string();
    }
    format!("warn,mobile_seg={level},mobile_seg_core={level}")
}

/// Installs the global subscriber.
///
/// `MOBILE_SEG_LOG_LEVEL`, when set and parseable, replaces the directive
/// built from the flags. Repeated calls are no-ops.
pub fn init_logging(format: LogFormat, verbosity: u8, quiet: bool, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity, quiet)));

    // Module paths only help once tracing individual loader stages.
    let show_target = verbosity >= 3;

    match format {
        LogFormat::Human => {
            let use_ansi = match color {
                ColorChoice::Auto => {
                    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
                }
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .without_time()
                .with_ansi(use_ansi)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

/// Span covering one CLI invocation.
///
/// Created at error level so its fields accompany every event the filter
/// lets through, including under `--quiet`.
#[must_use]
pub fn run_span(command: &Commands) -> Span {
    tracing::error_span!("run", command = command.name(), params = %command.inputs())
}
