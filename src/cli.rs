// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CLI argument parsing for tally.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tally - compile and run tally programs on a stack VM
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Read configuration from this file only
    #[arg(long, global = true, value_name = "PATH", env = "TALLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Compile and run inline source instead of a file
    #[arg(short = 'e', long = "eval", value_name = "CODE")]
    pub eval: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile and execute a program
    Run(RunArgs),

    /// Compile a program without running it
    Check(FileArgs),

    /// Print the bytecode listing of a program
    #[command(alias = "dis")]
    Disasm(FileArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source file
    pub file: PathBuf,

    /// Print the bytecode listing before executing
    #[arg(short, long)]
    pub listing: bool,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Source file
    pub file: PathBuf,
}
