//! CLI command definitions

use crate::core::{
    config::Platform,
    value::{nested, overlay, Mapping},
};
use crate::generation::PipelineKind;
use clap::Args;
use std::path::PathBuf;

/// Arguments shared by every pipeline
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Instance types to run on
    #[arg(long, num_args = 1..)]
    pub instances: Option<Vec<String>>,

    /// Platforms to run on
    #[arg(long, value_name = "OS-KV", num_args = 1.., value_parser = parse_platform)]
    pub platforms: Option<Vec<Platform>>,

    /// Parameters to add to each step (nested keys separated by '/')
    #[arg(long = "step-param", value_name = "PARAM=VALUE", value_parser = parse_step_param)]
    pub step_param: Vec<Mapping>,

    /// Use the binaries from this path instead of building them
    #[arg(long)]
    pub binary_dir: Option<String>,

    /// Treat these files as changed instead of asking git
    #[arg(long = "changed-file", value_name = "PATH")]
    pub changed_file: Vec<PathBuf>,

    /// Explain on stderr which groups were selected
    #[arg(long)]
    pub explain: bool,
}

impl GenerateCommand {
    /// All `--step-param` overrides folded into one patch, in order
    pub fn step_params(&self) -> Mapping {
        self.step_param
            .iter()
            .fold(Mapping::new(), |acc, patch| overlay(&acc, patch))
    }
}

impl From<&super::Command> for PipelineKind {
    fn from(command: &super::Command) -> Self {
        match command {
            super::Command::Pr(_) => PipelineKind::PullRequest,
            super::Command::Optional(_) => PipelineKind::Optional,
        }
    }
}

/// Parse an `OS-KV` platform
pub fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse()
}

/// Parse `a/b/c=value` into `{a: {b: {c: "value"}}}`
pub fn parse_step_param(s: &str) -> Result<Mapping, String> {
    match s.split_once('=') {
        Some((path, value)) => Ok(nested(path, value)),
        None => Err(format!("Invalid PARAM=VALUE pair: {}", s)),
    }
}
