//! Generation context - environment and command-line state
//!
//! Everything the generators need from the outside world is collected here
//! once at startup; generation itself never reads the environment.

use crate::core::condition::ChangedFiles;
use crate::core::config::GeneratorConfig;
use crate::core::value::Mapping;

/// Set by Buildkite to the pull request number, or `false` outside PRs
pub const PULL_REQUEST_VAR: &str = "BUILDKITE_PULL_REQUEST";
/// Set by Buildkite to the branch a pull request targets
pub const BASE_BRANCH_VAR: &str = "BUILDKITE_PULL_REQUEST_BASE_BRANCH";
const DEFAULT_BASE_BRANCH: &str = "main";

/// The CI-provided environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiEnvironment {
    /// Pull request identifier, when running for one
    pub pull_request: Option<String>,

    /// Branch the pull request targets
    pub base_branch: String,
}

impl CiEnvironment {
    /// Read the environment of the current process
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the environment from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pull_request = lookup(PULL_REQUEST_VAR).filter(|pr| pr != "false");
        let base_branch = lookup(BASE_BRANCH_VAR).unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string());
        Self {
            pull_request,
            base_branch,
        }
    }

    /// Environment outside of any pull request
    pub fn outside_pull_request() -> Self {
        Self {
            pull_request: None,
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
        }
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// The revision pull request changes are compared against
    pub fn base_revision(&self) -> Option<&str> {
        self.is_pull_request().then_some(self.base_branch.as_str())
    }
}

/// Immutable inputs of one generator run
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Instance/platform matrix and step defaults
    pub config: GeneratorConfig,

    /// Overrides applied on top of every step (`--step-param`)
    pub step_params: Mapping,

    /// Location of pre-built binaries; when unset the pipeline builds them
    pub binary_dir: Option<String>,

    /// Base branch to also build for A/B comparisons, in PR context
    pub base_revision: Option<String>,

    /// Files changed by the pull request
    pub changed_files: ChangedFiles,
}

impl GenerationContext {
    pub fn new(config: GeneratorConfig, changed_files: ChangedFiles) -> Self {
        Self {
            config,
            step_params: Mapping::new(),
            binary_dir: None,
            base_revision: None,
            changed_files,
        }
    }

    pub fn with_step_params(mut self, step_params: Mapping) -> Self {
        self.step_params = step_params;
        self
    }

    pub fn with_binary_dir(mut self, binary_dir: Option<String>) -> Self {
        self.binary_dir = binary_dir;
        self
    }

    pub fn with_environment(mut self, env: &CiEnvironment) -> Self {
        self.base_revision = env.base_revision().map(str::to_string);
        self
    }
}
