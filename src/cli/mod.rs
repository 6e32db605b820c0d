//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ListCommand, RunCommand, ScriptCommand, ValidateCommand, WorkerCommand};

/// NIAK/PSOM pipeline launcher
#[derive(Debug, Parser, Clone)]
#[command(name = "niakrun")]
#[command(author = "Niakrun Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A launcher for NIAK/PSOM neuroimaging pipelines on Octave", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Launch a pipeline through Octave
    Run(RunCommand),

    /// Print the Octave script a launch would run
    Script(ScriptCommand),

    /// Check launch inputs without launching anything
    Validate(ValidateCommand),

    /// List the supported pipelines
    List(ListCommand),

    /// Attach a PSOM worker to a running pipeline
    Worker(WorkerCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
