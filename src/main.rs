use anyhow::{Context, Result};
use pipeline_gen::changes::{ChangeSource, GitChangeSource, GitDiffConfig, StaticChangeSource};
use pipeline_gen::cli::output::{format_changes, format_pipeline_summary, format_selection};
use pipeline_gen::cli::Cli;
use pipeline_gen::core::{CiEnvironment, GenerationContext, GeneratorConfig};
use pipeline_gen::generation::{PipelineKind, Selection};
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; stdout is reserved for the pipeline
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let kind = PipelineKind::from(&cli.command);
    let ctx = build_context(&cli).await?;

    let pipeline = kind
        .assemble(&ctx)
        .context("Failed to generate pipeline")?;

    if cli.command.args().explain {
        eprintln!("{}", format_changes(&ctx.changed_files, 20));
        if kind == PipelineKind::PullRequest {
            eprintln!("{}", format_selection(&Selection::from_changes(&ctx.changed_files)));
        }
        eprintln!("{}", format_pipeline_summary(&pipeline));
    }

    let json = pipeline.to_json().context("Failed to serialize pipeline")?;
    println!("{}", json);

    Ok(())
}

/// Collect configuration, environment and changed files once
async fn build_context(cli: &Cli) -> Result<GenerationContext> {
    let args = cli.command.args();

    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load generator config {}", path))?,
        None => GeneratorConfig::default(),
    };
    let config = config
        .with_instances(args.instances.clone())
        .with_platforms(args.platforms.clone());
    config.validate()?;

    let env = CiEnvironment::from_env();
    debug!("CI environment: {:?}", env);

    let source: Box<dyn ChangeSource> = if args.changed_file.is_empty() {
        Box::new(GitChangeSource::new(GitDiffConfig::from_environment(&env)))
    } else {
        Box::new(StaticChangeSource::new(args.changed_file.clone()))
    };
    let changed_files = source
        .changed_files()
        .await
        .context("Failed to list changed files")?;

    Ok(GenerationContext::new(config, changed_files)
        .with_step_params(args.step_params())
        .with_binary_dir(args.binary_dir.clone())
        .with_environment(&env))
}
