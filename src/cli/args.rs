//! CLI argument definitions
//!
//! All Clap derive structs for `mobile-seg` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::EXP_DIR;
use crate::config::loader::LoaderOptions;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Load, check and fan out training hyperparameters.
#[derive(Parser, Debug)]
#[command(name = "mobile-seg", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "MOBILE_SEG_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a parameter file and print the full parameter set.
    Show(ShowArgs),

    /// Validate parameter files.
    Validate(ValidateArgs),

    /// Print one parameter set per cross-validation fold.
    Cv(CvArgs),
}

impl Commands {
    /// Subcommand name as typed on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Show(_) => "show",
            Self::Validate(_) => "validate",
            Self::Cv(_) => "cv",
        }
    }

    /// Parameter files this command reads, comma separated.
    #[must_use]
    pub fn inputs(&self) -> String {
        match self {
            Self::Show(ShowArgs { config, .. }) | Self::Cv(CvArgs { config, .. }) => {
                config.display().to_string()
            }
            Self::Validate(args) => args
                .files
                .iter()
                .map(|f| f.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Loader settings shared by every command.
#[derive(Args, Debug)]
pub struct LoaderArgs {
    /// Directory used for `trainer_params.save_dir` when a file omits it.
    #[arg(long, default_value = EXP_DIR, env = "MOBILE_SEG_EXP_DIR")]
    pub exp_dir: PathBuf,
}

impl LoaderArgs {
    /// Loader options for these arguments.
    #[must_use]
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            exp_dir: self.exp_dir.clone(),
            ..LoaderOptions::default()
        }
    }
}

/// Arguments for `show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the YAML parameter file.
    pub config: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "yaml")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub loader: LoaderArgs,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Parameter files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub loader: LoaderArgs,
}

/// Arguments for `cv`.
#[derive(Args, Debug)]
pub struct CvArgs {
    /// Path to the YAML parameter file.
    pub config: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "yaml")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub loader: LoaderArgs,
}

// ============================================================================
// Value Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for printed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// YAML, reloadable as a parameter file.
    #[default]
    Yaml,
    /// JSON.
    Json,
}
