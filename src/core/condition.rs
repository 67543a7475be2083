//! Changed-file conditions
//!
//! Decides which step groups a pull request needs from the paths it
//! touches. An empty set means there is no pull request context (or nothing
//! changed) and is treated as "run everything".

use std::path::{Path, PathBuf};

/// Suffix of documentation files that never require a test run
const DOCS_SUFFIX: &str = "md";
/// Directory holding CI-only configuration
const CI_CONFIG_DIR: &str = ".github";
/// Suffix of CI-only configuration files
const CI_CONFIG_SUFFIX: &str = "yml";
/// File name of the development container definition
const DEV_CONTAINER_FILE: &str = "Dockerfile";
/// Directory holding the developer tooling
const TOOLS_DIR: &str = "tools";
const RELEASE_MARKER: &str = "release";
const DEVTOOL_NAME: &str = "devtool";
/// Suffixes of sources covered by formal verification
const VERIFIED_SUFFIXES: [&str; 3] = ["rs", "toml", "lock"];

/// The files changed by a pull request, in the order reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFiles {
    paths: Vec<PathBuf>,
}

impl ChangedFiles {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// No pull request context, or nothing changed
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the full test suite must run
    ///
    /// True when nothing is known about the change, or when any file is
    /// neither documentation nor CI-only configuration.
    pub fn should_run_everything(&self) -> bool {
        self.is_empty()
            || self
                .paths
                .iter()
                .any(|path| suffix(path) != Some(DOCS_SUFFIX) && !is_ci_config(path))
    }

    /// Whether the development container definition changed
    pub fn touches_dev_container(&self) -> bool {
        self.paths
            .iter()
            .any(|path| file_name(path) == Some(DEV_CONTAINER_FILE))
    }

    /// Whether release tooling changed
    pub fn touches_release_tooling(&self) -> bool {
        self.paths.iter().any(|path| {
            let in_tools = path.parent().and_then(file_name) == Some(TOOLS_DIR);
            let name = file_name(path).unwrap_or("");
            in_tools && (name.contains(RELEASE_MARKER) || name == DEVTOOL_NAME)
        })
    }

    /// Whether formal verification has to run
    pub fn needs_verification(&self) -> bool {
        self.is_empty()
            || self
                .paths
                .iter()
                .any(|path| suffix(path).is_some_and(|s| VERIFIED_SUFFIXES.contains(&s)))
    }
}

/// Free-function form of [`ChangedFiles::should_run_everything`]
pub fn should_run_everything(changed: &ChangedFiles) -> bool {
    changed.should_run_everything()
}

fn suffix(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn is_ci_config(path: &Path) -> bool {
    let top = path.components().next().and_then(|c| c.as_os_str().to_str());
    top == Some(CI_CONFIG_DIR) && suffix(path) == Some(CI_CONFIG_SUFFIX)
}
