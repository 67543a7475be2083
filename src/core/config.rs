//! Generator configuration from YAML

use crate::core::value::Mapping;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// An (OS, kernel) pair that steps are scheduled on
///
/// Written as `OS-KERNEL`, split on the first `-`: `al2-linux_5.10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Platform {
    pub os: String,
    pub kernel: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, kernel: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            kernel: kernel.into(),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((os, kernel)) if !os.is_empty() && !kernel.is_empty() => Ok(Self::new(os, kernel)),
            _ => Err(format!("Invalid platform '{}', expected OS-KERNEL", s)),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.kernel)
    }
}

/// Instance types and platforms a generator targets, plus step defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Instances every per-instance group runs on
    pub instances: Vec<String>,

    /// Platforms every per-instance group runs on
    pub platforms: Vec<Platform>,

    /// Instances for groups that only need one machine per architecture
    pub arch_instances: Vec<String>,

    /// Platforms for per-architecture groups
    pub arch_platforms: Vec<Platform>,

    /// Artifact globs uploaded by every generated step
    pub artifacts: Vec<String>,

    /// Default step timeout
    pub timeout_in_minutes: i64,

    /// Extra attributes merged into every generated step
    pub step_defaults: Mapping,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            instances: [
                "c5n.metal", // Intel Skylake
                "m5n.metal", // Intel Cascade Lake
                "m6i.metal", // Intel Icelake
                "m6a.metal", // AMD Milan
                "m6g.metal", // Graviton2
                "m7g.metal", // Graviton3
            ]
            .map(String::from)
            .to_vec(),
            platforms: vec![
                Platform::new("al2", "linux_4.14"),
                Platform::new("al2", "linux_5.10"),
                Platform::new("al2023", "linux_6.1"),
            ],
            arch_instances: vec!["m6i.metal".to_string(), "m7g.metal".to_string()],
            arch_platforms: vec![Platform::new("al2", "linux_5.10")],
            artifacts: vec!["./test_results/**/*".to_string()],
            timeout_in_minutes: 20,
            step_defaults: Mapping::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load generator configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse generator configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the instance list, when given
    pub fn with_instances(mut self, instances: Option<Vec<String>>) -> Self {
        if let Some(instances) = instances {
            self.instances = instances;
        }
        self
    }

    /// Replace the platform list, when given
    pub fn with_platforms(mut self, platforms: Option<Vec<Platform>>) -> Self {
        if let Some(platforms) = platforms {
            self.platforms = platforms;
        }
        self
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> Result<()> {
        // Buildkite rejects groups without steps
        if self.instances.is_empty() {
            anyhow::bail!("At least one instance is required");
        }
        if self.platforms.is_empty() {
            anyhow::bail!("At least one platform is required");
        }
        if self.arch_instances.is_empty() || self.arch_platforms.is_empty() {
            anyhow::bail!("At least one per-architecture instance and platform is required");
        }

        for instance in self.instances.iter().chain(&self.arch_instances) {
            if instance.trim().is_empty() {
                anyhow::bail!("Instance names must not be empty");
            }
        }

        if self.timeout_in_minutes <= 0 {
            anyhow::bail!(
                "timeout_in_minutes must be positive, got {}",
                self.timeout_in_minutes
            );
        }

        Ok(())
    }
}
