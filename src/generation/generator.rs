//! Step generator - one step per instance and platform

use crate::core::{
    config::Platform,
    context::GenerationContext,
    step::{label_marker, Group, Step},
    template::{interpolate_mapping, render, TemplateError, Variables},
    value::{overlay, Mapping, Value},
};
use tracing::debug;

/// Ordered command templates of a group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commands(Vec<String>);

impl Commands {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for Commands {
    fn from(command: &str) -> Self {
        Commands(vec![command.to_string()])
    }
}

impl From<String> for Commands {
    fn from(command: String) -> Self {
        Commands(vec![command])
    }
}

impl From<Vec<String>> for Commands {
    fn from(commands: Vec<String>) -> Self {
        Commands(commands)
    }
}

impl From<Vec<&str>> for Commands {
    fn from(commands: Vec<&str>) -> Self {
        Commands(commands.into_iter().map(String::from).collect())
    }
}

/// Variables every step template can reference
pub fn step_variables(instance: &str, platform: &Platform) -> Variables {
    Variables::from([
        ("instance".to_string(), instance.to_string()),
        ("os".to_string(), platform.os.clone()),
        ("kv".to_string(), platform.kernel.clone()),
    ])
}

/// Generate a group with one step per instance and platform
///
/// Steps are ordered by instance first, then platform. Each step gets its
/// commands rendered, a label made of the group's marker and its target,
/// and an agent selection. `extra_config` is rendered with the same
/// variables and sits underneath: the generated fields win on conflicts,
/// while nested mappings such as `agents` are merged.
pub fn make_group(
    label: &str,
    commands: impl Into<Commands>,
    instances: &[String],
    platforms: &[Platform],
    extra_config: &Mapping,
) -> Result<Group, TemplateError> {
    let commands = commands.into();
    let marker = label_marker(label);
    let mut steps = Vec::with_capacity(instances.len() * platforms.len());

    for instance in instances {
        for platform in platforms {
            let variables = step_variables(instance, platform);

            let command = commands
                .iter()
                .map(|cmd| render(cmd, &variables))
                .collect::<Result<Vec<_>, _>>()?;
            let agents: Mapping = variables
                .iter()
                .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
                .collect();

            let base = Mapping::from([
                ("command".to_string(), Value::from(command)),
                (
                    "label".to_string(),
                    Value::String(format!("{} {} {} {}", marker, instance, platform.os, platform.kernel)),
                ),
                ("agents".to_string(), Value::Mapping(agents)),
            ]);

            let extra = interpolate_mapping(extra_config, &variables)?;
            steps.push(Step::from_mapping(overlay(&extra, &base)));
        }
    }

    debug!("Generated group '{}' with {} steps", label, steps.len());
    Ok(Group::new(label, steps))
}

/// Targets and extra configuration a group is generated from
#[derive(Debug, Clone, PartialEq)]
pub struct StepDefaults {
    pub instances: Vec<String>,
    pub platforms: Vec<Platform>,
    pub config: Mapping,
}

impl StepDefaults {
    /// Defaults covering the whole instance/platform matrix
    ///
    /// The extra configuration is layered as: artifact globs, configured
    /// step defaults, `extra`, and finally the user's step parameters.
    pub fn per_instance(ctx: &GenerationContext, extra: &Mapping) -> Self {
        let artifacts = Mapping::from([(
            "artifacts".to_string(),
            Value::from(ctx.config.artifacts.clone()),
        )]);
        let config = [&ctx.config.step_defaults, extra, &ctx.step_params]
            .into_iter()
            .fold(artifacts, |acc, patch| overlay(&acc, patch));

        Self {
            instances: ctx.config.instances.clone(),
            platforms: ctx.config.platforms.clone(),
            config,
        }
    }

    /// The same defaults, restricted to one machine per architecture
    pub fn per_arch(&self, ctx: &GenerationContext) -> Self {
        self.clone()
            .with_instances(ctx.config.arch_instances.clone())
            .with_platforms(ctx.config.arch_platforms.clone())
    }

    /// Overlay a patch on the extra configuration
    pub fn overlay(&self, patch: &Mapping) -> Self {
        Self {
            config: overlay(&self.config, patch),
            ..self.clone()
        }
    }

    pub fn with_instances(mut self, instances: Vec<String>) -> Self {
        self.instances = instances;
        self
    }

    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = platforms;
        self
    }

    /// Generate a group from these defaults
    pub fn group(&self, label: &str, commands: impl Into<Commands>) -> Result<Group, TemplateError> {
        make_group(label, commands, &self.instances, &self.platforms, &self.config)
    }
}
