//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::GenerateCommand;
use std::ffi::OsString;

/// Buildkite pipeline generator
#[derive(Debug, Parser, Clone)]
#[command(name = "pipeline-gen")]
#[command(author = "Pipeline Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Generates Buildkite pipelines from the files a pull request changes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a generator configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate the blocking pull request pipeline
    Pr(GenerateCommand),

    /// Generate the non-blocking pipeline
    Optional(GenerateCommand),
}

impl Command {
    /// The generation arguments, whichever pipeline is requested
    pub fn args(&self) -> &GenerateCommand {
        match self {
            Command::Pr(cmd) | Command::Optional(cmd) => cmd,
        }
    }
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
