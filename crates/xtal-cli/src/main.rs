mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::Cli;
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("xtal-classify v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let config = config::build_config(&cli)?;

    // Buffer the report so a failed run prints nothing to stdout.
    let mut report = Vec::new();
    let result = commands::classify::run(&config, &mut report);
    match &result {
        Ok(()) => {
            use std::io::Write;
            std::io::stdout().write_all(&report)?;
            info!("Classification completed successfully.");
        }
        Err(e) => error!("Classification failed: {}", e),
    }
    result
}
