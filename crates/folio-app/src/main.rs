// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — orientation-corrected OCR of scanned pages
//
// Entry point. Initialises logging, loads the configuration, applies
// command-line overrides and runs the requested pipeline steps.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use folio_core::config::PipelineConfig;
use folio_core::error::Result;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "folio failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            PipelineConfig::load(path)?
        }
        None => PipelineConfig::default(),
    };
    cli.apply(&mut config)?;
    config.validate()?;
    Ok(config)
}

fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let dir = cli.command.dir();
    tracing::info!(dir = %dir.display(), language = %config.language, "Folio starting");

    match &cli.command {
        Command::Ocr { .. } => {
            commands::run_ocr(dir, &config)?;
        }
        Command::Sanitize { .. } => {
            commands::run_sanitize(dir, &config)?;
        }
        Command::Run { .. } => commands::run_all(dir, &config)?,
    }
    Ok(())
}
