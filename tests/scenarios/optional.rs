//! Test: Optional pipeline
//!
//! The non-blocking pipeline is either empty or a single group of tests
//! scheduled on dedicated agents.

use crate::helpers::*;
use pipeline_gen::core::Value;
use pipeline_gen::generation::assembler::{OPTIONAL_LABEL, SHARED_BUILD_LABEL};
use pipeline_gen::generation::PipelineKind;

/// Documentation changes produce an empty, still valid, pipeline
#[tokio::test]
async fn test_docs_change_yields_empty_pipeline() {
    let pipeline = generate(PipelineKind::Optional, &["docs/getting-started.md"]).await;

    assert!(pipeline.is_empty());
    assert_eq!(pipeline.to_json().unwrap(), "{\n    \"steps\": []\n}");
}

#[tokio::test]
async fn test_code_change_runs_optional_tests() {
    let pipeline = generate(PipelineKind::Optional, &["src/vmm/src/builder.rs"]).await;
    assert_outline(&pipeline, &[SHARED_BUILD_LABEL, "wait", OPTIONAL_LABEL]);

    let steps = group_steps(&pipeline, OPTIONAL_LABEL);
    assert_eq!(steps.len(), 18);

    let step = &steps[0];
    assert_eq!(step.label(), Some("❓ c5n.metal al2 linux_4.14"));
    assert_eq!(
        step.commands().last().copied(),
        Some(
            "./tools/devtool -y test --no-build --performance -c 1-10 -m 0 -- \
             integration_tests/ -m 'no_block_pr and not nonci' --log-cli-level=INFO"
        )
    );
}

/// Every optional step lands on a dedicated agent
#[tokio::test]
async fn test_optional_steps_use_dedicated_agents() {
    let pipeline = generate(PipelineKind::Optional, &[]).await;

    for step in group_steps(&pipeline, OPTIONAL_LABEL) {
        assert_eq!(step.get("priority"), Some(&Value::from(2)));
        assert_eq!(step.agents().and_then(|a| a.get("ag")), Some(&Value::from(1)));
    }
}

/// Pre-built binaries skip the shared build and its barrier
#[tokio::test]
async fn test_prebuilt_directory() {
    let source = MockChangeSource::new(&["src/lib.rs"]);
    let options = RunOptions {
        binary_dir: Some("release-v1.7".to_string()),
        ..Default::default()
    };

    let pipeline = generate_with_source(PipelineKind::Optional, &source, options)
        .await
        .unwrap();
    assert_outline(&pipeline, &[OPTIONAL_LABEL]);

    let step = &group_steps(&pipeline, OPTIONAL_LABEL)[0];
    let commands = step.commands();
    assert_eq!(
        commands[0],
        "buildkite-agent artifact download \"release-v1.7/$(uname -m)/*\" ."
    );
    assert_eq!(commands[1], "chmod -v a+x release-v1.7/**/*");
    assert!(commands[2].contains("--binary-dir=../release-v1.7/$(uname -m)"));
}

/// A failing diff aborts generation instead of producing a partial pipeline
#[tokio::test]
async fn test_failing_change_source() {
    let source = MockChangeSource::failing();

    let result = generate_with_source(PipelineKind::Optional, &source, RunOptions::default()).await;

    let err = result.unwrap_err();
    assert!(err.contains("origin/main"), "unexpected error: {}", err);
    assert_eq!(source.calls(), 1);
}
