//! Core domain models for pipeline generation
//!
//! This module defines the configuration values, steps, groups and
//! pipelines that generators assemble, plus the inputs they read.

pub mod condition;
pub mod config;
pub mod context;
pub mod pipeline;
pub mod step;
pub mod template;
pub mod value;

pub use condition::*;
pub use config::{GeneratorConfig, Platform};
pub use context::*;
pub use pipeline::*;
pub use step::*;
pub use template::{interpolate, interpolate_mapping, render, TemplateError, Variables};
pub use value::*;
