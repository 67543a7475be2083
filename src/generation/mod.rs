//! Pipeline generation
//!
//! Expands step templates over the instance/platform matrix and assembles
//! the groups a change set needs.

pub mod assembler;
pub mod commands;
pub mod generator;

pub use assembler::{optional_pipeline, pull_request_pipeline, PipelineKind, Selection, DEFAULT_PRIORITY};
pub use commands::{devtool_test, shared_build, ArtifactSource};
pub use generator::{make_group, step_variables, Commands, StepDefaults};
