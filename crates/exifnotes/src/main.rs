//! `exifnotes` - CLI for the film photography logbook
//!
//! This binary parses the command line, loads the configuration and hands the
//! command to [`exifnotes::cli::run`].

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;

use exifnotes::cli::Cli;
use exifnotes::{init_logging, Config, Error};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match exifnotes::cli::run(cli.command, config, &mut out).await {
        Ok(()) => {
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        // User mistakes get one line, not an error chain
        Err(
            e @ (Error::Validation { .. }
            | Error::InvalidValue { .. }
            | Error::NotFound { .. }
            | Error::InUse { .. }
            | Error::Parse(_)),
        ) => {
            out.flush()?;
            eprintln!("exifnotes: {e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
