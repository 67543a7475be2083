//! Conditional assembler - decides which groups a pipeline contains

use crate::core::{
    condition::ChangedFiles,
    context::GenerationContext,
    config::Platform,
    pipeline::Pipeline,
    step::Step,
    template::TemplateError,
    value::{nested, overlay, Mapping, Value},
};
use crate::generation::commands::{devtool_test, shared_build, ArtifactSource};
use crate::generation::generator::StepDefaults;
use tracing::{debug, info};

/// Buildkite's default job priority is 0; PR jobs go ahead of batch jobs
pub const DEFAULT_PRIORITY: i64 = 1;

pub const STYLE_LABEL: &str = "🪶 Style";
pub const SHARED_BUILD_LABEL: &str = "🏗️ Build";
pub const DEV_CONTAINER_LABEL: &str = "🐋 Dev Container Sanity Build";
pub const RELEASE_LABEL: &str = "📦 Release Sanity Build";
pub const KANI_LABEL: &str = "🔍 Kani";
pub const BUILD_LABEL: &str = "📦 Build";
pub const FUNCTIONAL_LABEL: &str = "⚙ Functional and security 🔒";
pub const PERFORMANCE_LABEL: &str = "⏱ Performance";
pub const OPTIONAL_LABEL: &str = "❓ Optional";

/// Kani runs fastest on this instance
const KANI_INSTANCE: &str = "m6a.metal";
const KANI_TIMEOUT_MINUTES: i64 = 300;
const PERFORMANCE_DEVTOOL_OPTS: &str = "--no-build --performance -c 1-10 -m 0";

/// Which pipeline to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// Blocking checks for a pull request
    PullRequest,
    /// Non-blocking tests that report without gating the merge
    Optional,
}

impl PipelineKind {
    /// Assemble the pipeline for a generation context
    pub fn assemble(self, ctx: &GenerationContext) -> Result<Pipeline, TemplateError> {
        match self {
            PipelineKind::PullRequest => pull_request_pipeline(ctx),
            PipelineKind::Optional => optional_pipeline(ctx),
        }
    }
}

/// The outcome of every inclusion predicate for a change set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub dev_container: bool,
    pub release: bool,
    pub verification: bool,
    pub full_suite: bool,
}

impl Selection {
    /// Evaluate the predicates against a change set
    pub fn from_changes(changed: &ChangedFiles) -> Self {
        Self {
            dev_container: changed.touches_dev_container(),
            release: changed.touches_release_tooling(),
            verification: changed.needs_verification(),
            full_suite: changed.should_run_everything(),
        }
    }

    /// Group labels paired with whether they are included
    pub fn decisions(&self) -> Vec<(&'static str, bool)> {
        vec![
            (DEV_CONTAINER_LABEL, self.dev_container),
            (RELEASE_LABEL, self.release),
            (KANI_LABEL, self.verification),
            (BUILD_LABEL, self.full_suite),
            (FUNCTIONAL_LABEL, self.full_suite),
            (PERFORMANCE_LABEL, self.full_suite),
        ]
    }
}

fn base_config(ctx: &GenerationContext, priority: i64) -> Mapping {
    Mapping::from([
        ("priority".to_string(), Value::from(priority)),
        (
            "timeout_in_minutes".to_string(),
            Value::from(ctx.config.timeout_in_minutes),
        ),
    ])
}

/// Configuration that keeps a group on dedicated `ag=1` agents
fn single_agent(priority: i64) -> Mapping {
    overlay(
        &Mapping::from([("priority".to_string(), Value::from(priority))]),
        &nested("agents/ag", 1),
    )
}

/// Resolve the binaries test steps use
///
/// Without a pre-built location a shared build group is appended, followed
/// by a barrier so nothing consumes the archive before it is uploaded.
fn binaries(
    ctx: &GenerationContext,
    per_arch: &StepDefaults,
    pipeline: &mut Pipeline,
) -> Result<ArtifactSource, TemplateError> {
    if let Some(location) = &ctx.binary_dir {
        debug!("Using pre-built binaries from {}", location);
        return Ok(ArtifactSource::from_location(location));
    }

    let (cmds, source) = shared_build(ctx.base_revision.as_deref());
    pipeline.push(per_arch.group(SHARED_BUILD_LABEL, cmds)?);
    pipeline.wait();
    Ok(source)
}

/// The blocking pull request pipeline
///
/// Order: style, shared build and barrier, then the optional sanity and
/// verification groups, then build, functional and performance tests.
pub fn pull_request_pipeline(ctx: &GenerationContext) -> Result<Pipeline, TemplateError> {
    let selection = Selection::from_changes(&ctx.changed_files);
    info!(
        "Assembling pull request pipeline for {} changed files",
        ctx.changed_files.len()
    );

    let mut pipeline = Pipeline::new();
    pipeline.push(
        Step::new("./tools/devtool -y checkstyle", STYLE_LABEL).with("priority", DEFAULT_PRIORITY),
    );

    let per_instance = StepDefaults::per_instance(ctx, &base_config(ctx, DEFAULT_PRIORITY));
    let per_arch = per_instance.per_arch(ctx);
    let source = binaries(ctx, &per_arch, &mut pipeline)?;

    if selection.dev_container {
        info!("Including {}", DEV_CONTAINER_LABEL);
        pipeline.push(per_arch.group(DEV_CONTAINER_LABEL, "./tools/devtool -y build_devctr")?);
    }

    if selection.release {
        info!("Including {}", RELEASE_LABEL);
        pipeline.push(per_arch.group(RELEASE_LABEL, "./tools/devtool -y make_release")?);
    }

    let performance = per_instance.overlay(&single_agent(DEFAULT_PRIORITY + 1));

    if selection.verification {
        info!("Including {}", KANI_LABEL);
        let kani = performance
            .overlay(&nested("timeout_in_minutes", KANI_TIMEOUT_MINUTES))
            .with_instances(vec![KANI_INSTANCE.to_string()])
            .with_platforms(vec![Platform::new("al2", "linux_5.10")]);
        let group = kani
            .group(
                KANI_LABEL,
                "./tools/devtool -y test -- ../tests/integration_tests/test_kani.py -n auto",
            )?
            .with_step_labels(KANI_LABEL);
        pipeline.push(group);
    }

    if selection.full_suite {
        info!("Including build, functional and performance tests");
        pipeline.push(per_instance.group(
            BUILD_LABEL,
            devtool_test(
                Some("--no-build"),
                Some("integration_tests/build/"),
                Some(&source),
            ),
        )?);
        pipeline.push(per_instance.group(
            FUNCTIONAL_LABEL,
            devtool_test(
                Some("--no-build"),
                Some("-n 8 --dist worksteal integration_tests/{{functional,security}}"),
                Some(&source),
            ),
        )?);
        pipeline.push(performance.group(
            PERFORMANCE_LABEL,
            devtool_test(
                Some(PERFORMANCE_DEVTOOL_OPTS),
                Some("../tests/integration_tests/performance/"),
                Some(&source),
            ),
        )?);
    }

    Ok(pipeline)
}

/// The non-blocking pipeline
///
/// Runs only when the full suite would, on `ag=1` agents since some of the
/// tests are performance tests. Otherwise the pipeline is empty.
pub fn optional_pipeline(ctx: &GenerationContext) -> Result<Pipeline, TemplateError> {
    let mut pipeline = Pipeline::new();
    if !ctx.changed_files.should_run_everything() {
        info!("No changes requiring optional tests");
        return Ok(pipeline);
    }

    let extra = overlay(
        &base_config(ctx, DEFAULT_PRIORITY),
        &single_agent(DEFAULT_PRIORITY + 1),
    );
    let per_instance = StepDefaults::per_instance(ctx, &extra);
    let per_arch = per_instance.per_arch(ctx);
    let source = binaries(ctx, &per_arch, &mut pipeline)?;

    pipeline.push(per_instance.group(
        OPTIONAL_LABEL,
        devtool_test(
            Some(PERFORMANCE_DEVTOOL_OPTS),
            Some("integration_tests/ -m 'no_block_pr and not nonci' --log-cli-level=INFO"),
            Some(&source),
        ),
    )?);

    Ok(pipeline)
}
