// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! tally - compile and run programs written in the tally language
//!
//! This is the main entry point for the tally CLI/REPL.
//!
//! ## Features
//!
//! - `run`, `check` and `disasm` subcommands for source files
//! - `-e` for inline source
//! - Interactive REPL with highlighting, history and persistent variables

mod cli;
mod config;
mod repl;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use tally_core::Bytecode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            print_error(!cli.no_color, &err);
            return ExitCode::FAILURE;
        }
    };
    if cli.no_color {
        config.color = false;
    }

    init_tracing(cli.verbose, &config);
    debug!(?config, "configuration loaded");

    match dispatch(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(config.color, &err);
            ExitCode::FAILURE
        }
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(verbose: bool, config: &Config) {
    let default_filter = if verbose { "debug" } else { config.log.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn dispatch(cli: &Cli, config: &Config) -> Result<()> {
    match (&cli.command, &cli.eval) {
        (Some(_), Some(_)) => bail!("-e cannot be combined with a subcommand"),
        (Some(Commands::Run(args)), None) => {
            let source = read_source(&args.file)?;
            run_source(&source, args.listing || config.listing)
        }
        (Some(Commands::Check(args)), None) => {
            let source = read_source(&args.file)?;
            let bytecode = compile_source(&source)?;
            println!("ok ({} instructions)", bytecode.len());
            Ok(())
        }
        (Some(Commands::Disasm(args)), None) => {
            let source = read_source(&args.file)?;
            let bytecode = compile_source(&source)?;
            print!("{}", bytecode);
            Ok(())
        }
        (None, Some(code)) => run_source(code, config.listing),
        (None, None) => repl::Repl::new(config)
            .context("failed to initialize the REPL")?
            .run()
            .context("REPL failed"),
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn compile_source(source: &str) -> Result<Bytecode> {
    let tokens = tally_core::tokenize(source)?;
    let bytecode = tally_core::compile(&tokens)?;
    Ok(bytecode)
}

/// Compile, optionally list, then execute against stdin/stdout.
fn run_source(source: &str, listing: bool) -> Result<()> {
    let bytecode = compile_source(source)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if listing {
        write_listing(&mut out, &bytecode)?;
    }

    tally_core::execute(&bytecode, io::stdin().lock(), &mut out)?;
    Ok(())
}

/// The framed listing printed ahead of execution.
fn write_listing<W: Write>(out: &mut W, bytecode: &Bytecode) -> io::Result<()> {
    writeln!(out, "=== bytecode ===")?;
    write!(out, "{}", bytecode)?;
    writeln!(out, "================")?;
    writeln!(out)?;
    writeln!(out, "=== execution ===")?;
    Ok(())
}

/// Print a formatted error message
pub(crate) fn print_error(color: bool, error: &anyhow::Error) {
    if color {
        eprintln!("{}: {:#}", "Error".red().bold(), error);
    } else {
        eprintln!("Error: {:#}", error);
    }
}
