//! Test: Configuration and command-line overrides
//!
//! Step parameters, configured step defaults, custom matrices and the
//! pull request environment all shape the generated steps.

use crate::helpers::*;
use pipeline_gen::core::value::nested;
use pipeline_gen::core::{overlay, GeneratorConfig, Platform, Value};
use pipeline_gen::generation::assembler::{BUILD_LABEL, KANI_LABEL, SHARED_BUILD_LABEL};
use pipeline_gen::generation::PipelineKind;

/// Step parameters land in every generated step and merge with agents
#[tokio::test]
async fn test_step_params_reach_every_step() {
    let source = MockChangeSource::new(&["src/lib.rs"]);
    let options = RunOptions {
        step_params: overlay(&nested("agents/queue", "public-prod-us-east-1"), &nested("retry/manual", false)),
        ..Default::default()
    };

    let pipeline = generate_with_source(PipelineKind::PullRequest, &source, options)
        .await
        .unwrap();

    for group in pipeline.groups() {
        for step in group.steps() {
            let agents = step.agents().unwrap();
            assert_eq!(agents.get("queue"), Some(&Value::from("public-prod-us-east-1")));
            assert!(agents.contains_key("instance"));
            assert_eq!(step.get("retry"), Some(&Value::Mapping(nested("manual", false))));
        }
    }
}

/// Step parameters are overridden by group-specific settings
#[tokio::test]
async fn test_step_params_below_group_settings() {
    let source = MockChangeSource::new(&["src/lib.rs"]);
    let options = RunOptions {
        step_params: nested("timeout_in_minutes", 45),
        ..Default::default()
    };

    let pipeline = generate_with_source(PipelineKind::PullRequest, &source, options)
        .await
        .unwrap();

    let build = &group_steps(&pipeline, BUILD_LABEL)[0];
    assert_eq!(build.get("timeout_in_minutes"), Some(&Value::from(45)));

    let kani = &group_steps(&pipeline, KANI_LABEL)[0];
    assert_eq!(kani.get("timeout_in_minutes"), Some(&Value::from(300)));
}

/// Step parameters may reference the step's variables
#[tokio::test]
async fn test_step_params_are_interpolated() {
    let source = MockChangeSource::new(&["README.md"]);
    let options = RunOptions {
        step_params: nested("env/TARGET", "{instance}-{os}-{kv}"),
        ..Default::default()
    };

    let pipeline = generate_with_source(PipelineKind::PullRequest, &source, options)
        .await
        .unwrap();

    let targets: Vec<_> = group_steps(&pipeline, SHARED_BUILD_LABEL)
        .iter()
        .map(|step| step.get("env").cloned())
        .collect();
    assert_eq!(
        targets,
        vec![
            Some(Value::Mapping(nested("TARGET", "m6i.metal-al2-linux_5.10"))),
            Some(Value::Mapping(nested("TARGET", "m7g.metal-al2-linux_5.10"))),
        ]
    );
}

/// An unknown variable in a step parameter fails generation
#[tokio::test]
async fn test_unknown_variable_in_step_param() {
    let source = MockChangeSource::new(&["README.md"]);
    let options = RunOptions {
        step_params: nested("env/TARGET", "{arch}"),
        ..Default::default()
    };

    let err = generate_with_source(PipelineKind::PullRequest, &source, options)
        .await
        .unwrap_err();
    assert!(err.contains("arch"), "unexpected error: {}", err);
}

/// Configured step defaults apply underneath generated fields
#[tokio::test]
async fn test_config_step_defaults() {
    let config = GeneratorConfig::from_yaml(
        r#"
step_defaults:
  soft_fail: true
  label: "ignored"
"#,
    )
    .unwrap();
    let source = MockChangeSource::new(&["README.md"]);
    let options = RunOptions {
        config,
        ..Default::default()
    };

    let pipeline = generate_with_source(PipelineKind::PullRequest, &source, options)
        .await
        .unwrap();

    let step = &group_steps(&pipeline, SHARED_BUILD_LABEL)[0];
    assert_eq!(step.get("soft_fail"), Some(&Value::from(true)));
    assert_eq!(step.label(), Some("🏗️ m6i.metal al2 linux_5.10"));
}

/// A narrowed matrix shrinks every per-instance group
#[tokio::test]
async fn test_custom_matrix() {
    let config = GeneratorConfig::default()
        .with_instances(Some(vec!["m6g.metal".to_string(), "c5n.metal".to_string()]))
        .with_platforms(Some(vec![
            Platform::new("al2023", "linux_6.1"),
            Platform::new("al2", "linux_5.10"),
        ]));
    let source = MockChangeSource::new(&["tests/conftest.py"]);
    let options = RunOptions {
        config,
        ..Default::default()
    };

    let pipeline = generate_with_source(PipelineKind::PullRequest, &source, options)
        .await
        .unwrap();

    assert_eq!(
        step_labels(&pipeline, BUILD_LABEL),
        vec![
            "📦 m6g.metal al2023 linux_6.1",
            "📦 m6g.metal al2 linux_5.10",
            "📦 c5n.metal al2023 linux_6.1",
            "📦 c5n.metal al2 linux_5.10",
        ]
    );
    // the shared build keeps its per-architecture machines
    assert_eq!(step_labels(&pipeline, SHARED_BUILD_LABEL).len(), 2);
}

/// In a pull request the base branch is built alongside the change
#[tokio::test]
async fn test_pull_request_builds_base_revision() {
    let source = MockChangeSource::new(&["README.md"]);
    let options = RunOptions {
        pull_request: true,
        ..Default::default()
    };

    let pipeline = generate_with_source(PipelineKind::PullRequest, &source, options)
        .await
        .unwrap();

    let step = &group_steps(&pipeline, SHARED_BUILD_LABEL)[0];
    let commands = step.commands();
    assert_eq!(commands.len(), 6);
    assert_eq!(commands[1], "git clone -b main build/main");
    assert_eq!(commands[2], "cd build/main && ./tools/devtool -y build --release && cd -");
}

/// A tarball of binaries is downloaded and unpacked by every test step
#[tokio::test]
async fn test_prebuilt_tarball() {
    let source = MockChangeSource::new(&["src/lib.rs"]);
    let options = RunOptions {
        binary_dir: Some("bins.tar.gz".to_string()),
        ..Default::default()
    };

    let pipeline = generate_with_source(PipelineKind::PullRequest, &source, options)
        .await
        .unwrap();

    assert!(pipeline.group(SHARED_BUILD_LABEL).is_none());
    assert!(!pipeline.outline().contains(&"wait"));

    let step = &group_steps(&pipeline, BUILD_LABEL)[0];
    assert_eq!(
        step.commands(),
        vec![
            "buildkite-agent artifact download bins.tar.gz .",
            "tar xzf bins.tar.gz",
            "./tools/devtool -y test --no-build -- integration_tests/build/",
        ]
    );
}
