//! pipeline-gen - Buildkite pipelines shaped by the files a pull request changes

pub mod changes;
pub mod cli;
pub mod core;
pub mod generation;

// Re-export commonly used types
pub use changes::{ChangeSource, ChangeSourceError, GitChangeSource, GitDiffConfig, StaticChangeSource};
pub use crate::core::{ChangedFiles, GenerationContext, GeneratorConfig, Group, Mapping, Pipeline, Platform, Step, Value};
pub use crate::core::{interpolate, overlay, serialize, TemplateError};
pub use generation::{make_group, PipelineKind, Selection};
