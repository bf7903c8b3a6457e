//! cibake - CI container recipe composer
//!
//! Entry point for the cibake command-line application.

use anyhow::Result;
use clap::Parser;

use cibake::cli::output::display_error;
use cibake::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only the recipe text.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level(&cli).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.run() {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}

fn log_level(cli: &Cli) -> tracing::Level {
    if cli.quiet {
        tracing::Level::ERROR
    } else {
        match cli.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}
