#![forbid(unsafe_code)]

//! abtest CLI
//!
//! Command-line interface for conversion-rate A/B test analysis.

use std::io::Write;
use std::process::ExitCode;

use abtest_cli::{Cli, commands, logging};
use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    logging::init(cli.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = match abtest_cli::run(cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(commands::exit_status(&e))
        }
    };
    out.flush().context("failed to flush stdout")?;
    Ok(code)
}
