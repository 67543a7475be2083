//! Sources of the changed-file set

pub mod error;
pub mod git;

use crate::core::condition::ChangedFiles;
use async_trait::async_trait;
use std::path::PathBuf;

pub use error::ChangeSourceError;
pub use git::{GitChangeSource, GitDiffConfig};

/// Trait for change detection - allows for different implementations
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// List the files changed by the current build
    async fn changed_files(&self) -> Result<ChangedFiles, ChangeSourceError>;
}

/// A fixed list of changed files
///
/// Used when the caller already knows the change set, e.g. from
/// `--changed-file` on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticChangeSource {
    paths: Vec<PathBuf>,
}

impl StaticChangeSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl ChangeSource for StaticChangeSource {
    async fn changed_files(&self) -> Result<ChangedFiles, ChangeSourceError> {
        Ok(ChangedFiles::new(self.paths.iter().cloned()))
    }
}
