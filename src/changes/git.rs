//! git subprocess change source - lists files changed against the base branch

use crate::changes::{ChangeSource, ChangeSourceError};
use crate::core::{condition::ChangedFiles, context::CiEnvironment};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Configuration for the git change source
#[derive(Debug, Clone)]
pub struct GitDiffConfig {
    /// Path to the git executable
    pub git_path: String,

    /// Remote the base branch is fetched from
    pub remote: String,

    /// Branch to diff against; `None` outside pull requests
    pub base_branch: Option<String>,

    /// Timeout for the diff in seconds
    pub timeout_secs: u64,

    /// Repository to run in; the current directory when unset
    pub repo_dir: Option<PathBuf>,
}

impl Default for GitDiffConfig {
    fn default() -> Self {
        Self {
            git_path: "git".to_string(),
            remote: "origin".to_string(),
            base_branch: None,
            timeout_secs: 120,
            repo_dir: None,
        }
    }
}

impl GitDiffConfig {
    /// Diff against the pull request base, if running for a pull request
    pub fn from_environment(env: &CiEnvironment) -> Self {
        Self {
            base_branch: env.base_revision().map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_git_path(mut self, git_path: impl Into<String>) -> Self {
        self.git_path = git_path.into();
        self
    }

    pub fn with_base_branch(mut self, base_branch: impl Into<String>) -> Self {
        self.base_branch = Some(base_branch.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_repo_dir(mut self, repo_dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(repo_dir.into());
        self
    }

    /// The revision changes are compared against, e.g. `origin/main`
    pub fn base_ref(&self) -> Option<String> {
        self.base_branch
            .as_ref()
            .map(|branch| format!("{}/{}", self.remote, branch))
    }
}

/// Change source that runs `git diff --name-only <remote>/<base>`
#[derive(Debug, Clone)]
pub struct GitChangeSource {
    config: GitDiffConfig,
}

impl GitChangeSource {
    pub fn new(config: GitDiffConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ChangeSource for GitChangeSource {
    /// Files are only considered changed in the context of a pull request;
    /// otherwise the set is empty.
    ///
    /// # Errors
    /// Returns `ChangeSourceError` if:
    /// - git cannot be spawned
    /// - git exits with a non-zero status (e.g. unknown base branch)
    /// - the output is not valid UTF-8
    /// - the command times out
    async fn changed_files(&self) -> Result<ChangedFiles, ChangeSourceError> {
        let Some(base) = self.config.base_ref() else {
            debug!("No pull request context, reporting no changed files");
            return Ok(ChangedFiles::empty());
        };

        debug!("Running {} diff --name-only {}", self.config.git_path, base);

        let mut cmd = Command::new(&self.config.git_path);
        cmd.args(["diff", "--name-only", base.as_str()]).kill_on_drop(true);
        if let Some(dir) = &self.config.repo_dir {
            cmd.current_dir(dir);
        }

        let result = timeout(Duration::from_secs(self.config.timeout_secs), cmd.output())
            .await
            .map_err(|_| ChangeSourceError::Timeout(self.config.timeout_secs))?;

        let output = result.map_err(|source| ChangeSourceError::Spawn {
            program: self.config.git_path.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            warn!("git diff exited with code {}: {}", code, stderr);
            return Err(ChangeSourceError::Exit { base, code, stderr });
        }

        let stdout = String::from_utf8(output.stdout)?;
        let changed = ChangedFiles::new(stdout.lines().filter(|l| !l.is_empty()).map(PathBuf::from));

        debug!("git diff reported {} changed files", changed.len());
        Ok(changed)
    }
}
