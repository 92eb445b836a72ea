mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use ferroscore_core::{init_logging, LogFormat};

use crate::cli::{Cli, LogFormatArg};
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(i32::from(error.exit_code()));
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let log_format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Json => LogFormat::Json,
    };
    init_logging(&cli.log_level, log_format);

    let payload = commands::run(&cli)?;
    output::render(&payload, cli.pretty)
}
