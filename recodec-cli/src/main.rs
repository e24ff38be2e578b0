// recodec-cli/src/main.rs
//
// Entry point of the `recodec` binary: parses the arguments, runs the
// pipeline and maps the outcome onto the process exit status.

use clap::Parser;
use console::style;
use recodec_cli::{Cli, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Missing or invalid arguments exit here with clap's usage error.
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Run failed: {:#}", e);
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::from(1)
        }
    }
}
