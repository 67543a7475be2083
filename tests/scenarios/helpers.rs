//! Test utility functions for pipeline-gen

use async_trait::async_trait;
use pipeline_gen::changes::{ChangeSource, ChangeSourceError};
use pipeline_gen::core::{ChangedFiles, CiEnvironment, GenerationContext, GeneratorConfig, Mapping, Pipeline, Step};
use pipeline_gen::generation::PipelineKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock change source that returns a predefined change set
pub struct MockChangeSource {
    changed: Option<Vec<String>>,
    calls: Arc<AtomicUsize>,
}

impl MockChangeSource {
    pub fn new(changed: &[&str]) -> Self {
        Self {
            changed: Some(changed.iter().map(|s| s.to_string()).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose diff always fails
    pub fn failing() -> Self {
        Self {
            changed: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeSource for MockChangeSource {
    async fn changed_files(&self) -> Result<ChangedFiles, ChangeSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.changed {
            Some(paths) => Ok(ChangedFiles::new(paths.iter().map(String::as_str))),
            None => Err(ChangeSourceError::Exit {
                base: "origin/main".to_string(),
                code: 128,
                stderr: "fatal: bad revision 'origin/main'".to_string(),
            }),
        }
    }
}

/// Options for a generator run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: GeneratorConfig,
    pub step_params: Mapping,
    pub binary_dir: Option<String>,
    pub pull_request: bool,
}

/// Build a context from a change source and generate a pipeline
pub async fn generate_with_source(
    kind: PipelineKind,
    source: &dyn ChangeSource,
    options: RunOptions,
) -> Result<Pipeline, String> {
    let env = if options.pull_request {
        CiEnvironment {
            pull_request: Some("1234".to_string()),
            base_branch: "main".to_string(),
        }
    } else {
        CiEnvironment::outside_pull_request()
    };

    let changed = source.changed_files().await.map_err(|e| e.to_string())?;
    let ctx = GenerationContext::new(options.config, changed)
        .with_step_params(options.step_params)
        .with_binary_dir(options.binary_dir)
        .with_environment(&env);

    kind.assemble(&ctx).map_err(|e| e.to_string())
}

/// Generate a pipeline for a fixed change set with default options
pub async fn generate(kind: PipelineKind, changed: &[&str]) -> Pipeline {
    let source = MockChangeSource::new(changed);
    generate_with_source(kind, &source, RunOptions::default())
        .await
        .unwrap_or_else(|e| panic!("Pipeline generation failed: {}", e))
}

/// Assert the top-level entries of a pipeline
pub fn assert_outline(pipeline: &Pipeline, expected: &[&str]) {
    let actual = pipeline.outline();
    assert_eq!(
        actual, expected,
        "Expected pipeline outline: {:?}\nActual: {:?}",
        expected, actual
    );
}

/// Steps of a group, panicking if the group is missing
pub fn group_steps<'a>(pipeline: &'a Pipeline, label: &str) -> &'a [Step] {
    pipeline
        .group(label)
        .unwrap_or_else(|| panic!("Group '{}' not found in {:?}", label, pipeline.outline()))
        .steps()
}

/// Labels of every step in a group
pub fn step_labels<'a>(pipeline: &'a Pipeline, label: &str) -> Vec<&'a str> {
    group_steps(pipeline, label)
        .iter()
        .filter_map(Step::label)
        .collect()
}
