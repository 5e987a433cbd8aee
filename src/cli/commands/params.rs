//! Parameter command handlers
//!
//! Implements `show`, `validate`, and `cv`.

use std::io::Write;

use crate::cli::args::{CvArgs, OutputFormat, ShowArgs, ValidateArgs};
use crate::config::Params;
use crate::config::loader::ConfigLoader;
use crate::error::{ConfigError, MobileSegError};

/// Load a parameter file and print it.
///
/// # Errors
///
/// Returns a config error if the file cannot be loaded.
pub fn show(args: &ShowArgs) -> Result<(), MobileSegError> {
    tracing::info!("loading parameters");
    let loader = ConfigLoader::new(args.loader.loader_options());
    let result = loader.load(&args.config)?;
    result.log_warnings();

    let mut out = std::io::stdout().lock();
    match args.format {
        OutputFormat::Yaml => write!(out, "{}", result.params.pretty()?)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&*result.params)?)?,
    }
    Ok(())
}

/// Validate parameter files.
///
/// Every file is checked even after a failure; the command fails if any
/// file does.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationFailed`] if at least one file fails
/// to load, or produces warnings under `--strict`.
pub fn validate(args: &ValidateArgs) -> Result<(), MobileSegError> {
    let loader = ConfigLoader::new(args.loader.loader_options());
    let mut failed = 0usize;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating parameters");

        match loader.load(path) {
            Ok(result) => {
                result.log_warnings();
                if args.strict && !result.warnings.is_empty() {
                    tracing::error!(
                        file = %path.display(),
                        warnings = result.warnings.len(),
                        "warnings are errors in strict mode"
                    );
                    failed += 1;
                } else {
                    tracing::info!(file = %path.display(), "parameters valid");
                }
            }
            Err(e) => {
                tracing::error!(file = %path.display(), "{e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(ConfigError::ValidationFailed { count: failed }.into());
    }
    Ok(())
}

/// Load a parameter file and print one parameter set per fold.
///
/// # Errors
///
/// Returns a config error if the file cannot be loaded or `n_splits` is
/// unset.
pub fn cv(args: &CvArgs) -> Result<(), MobileSegError> {
    tracing::info!("loading parameters");
    let loader = ConfigLoader::new(args.loader.loader_options());
    let result = loader.load(&args.config)?;
    result.log_warnings();

    if !result.params.do_cv() {
        tracing::info!(
            fold = result.params.d().fold,
            "fold is not the cross-validation sentinel; fanning out anyway"
        );
    }

    let folds = result.params.copy_for_cv()?;
    tracing::debug!(folds = folds.len(), "cross-validation fan-out");

    let mut out = std::io::stdout().lock();
    match args.format {
        OutputFormat::Yaml => {
            for params in &folds {
                write!(out, "{}", render_fold(params)?)?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&folds)?)?,
    }
    Ok(())
}

fn render_fold(params: &Params) -> Result<String, ConfigError> {
    Ok(format!("---\n# fold {}\n{}", params.d().fold, params.pretty()?))
}
