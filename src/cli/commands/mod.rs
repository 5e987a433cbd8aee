//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod params;

use crate::cli::args::{Cli, Commands};
use crate::error::MobileSegError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), MobileSegError> {
    match cli.command {
        Commands::Show(args) => params::show(&args),
        Commands::Validate(args) => params::validate(&args),
        Commands::Cv(args) => params::cv(&args),
    }
}
