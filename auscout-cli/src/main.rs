// auscout-cli/src/main.rs
//
// Entry point of the `auscout` binary.
//
// Responsibilities:
// - Parsing command-line arguments.
// - Setting up logging to the console or to a file.
// - Dispatching to the selected command.
// - Printing errors and managing the process exit code.

use auscout_cli::logging::init_logging;
use auscout_cli::output::print_error;
use auscout_cli::{Cli, run};
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();

    match init_logging(cli.verbose, cli.log_dir.as_deref(), cli.command.name()) {
        Ok(Some(log_file)) => log::info!("Logging to {}", log_file.display()),
        Ok(None) => {}
        Err(e) => {
            print_error(&e.to_string());
            process::exit(1);
        }
    }
    log::debug!("auscout {} starting: {:?}", env!("CARGO_PKG_VERSION"), cli.command);

    if let Err(e) = run(&cli) {
        log::error!("{e}");
        print_error(&e.to_string());
        process::exit(1);
    }
}
