//! `mobile-seg` — load, check and fan out training hyperparameters

use clap::Parser;

use mobile_seg::cli::args::Cli;
use mobile_seg::cli::commands;
use mobile_seg::error::ExitCode;
use mobile_seg::observability::{init_logging, run_span};

fn main() {
    let cli = Cli::parse();

    init_logging(cli.log_format, cli.verbose, cli.quiet, cli.color);
    let span = run_span(&cli.command);
    let result = span.in_scope(|| commands::dispatch(cli));

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
