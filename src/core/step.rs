//! Step and group domain model

use crate::core::value::{Mapping, Value};
use serde::{Serialize, Serializer};

/// A single schedulable unit of CI work
///
/// Steps are kept as a mapping so that any attribute the orchestrator
/// understands (priority, timeout, artifact globs, ...) passes through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Step {
    fields: Mapping,
}

impl Step {
    /// Create a step with a command and a label
    pub fn new(command: impl Into<Value>, label: impl Into<String>) -> Self {
        let fields = Mapping::from([
            ("command".to_string(), command.into()),
            ("label".to_string(), Value::String(label.into())),
        ]);
        Self { fields }
    }

    /// Wrap an already assembled mapping
    pub fn from_mapping(fields: Mapping) -> Self {
        Self { fields }
    }

    /// Set an attribute, replacing any previous value
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// The display label
    pub fn label(&self) -> Option<&str> {
        self.fields.get("label").and_then(Value::as_str)
    }

    /// The commands of this step; a single command string counts as one
    pub fn commands(&self) -> Vec<&str> {
        match self.fields.get("command") {
            Some(Value::String(cmd)) => vec![cmd.as_str()],
            Some(Value::Sequence(cmds)) => cmds.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// The agent selection mapping
    pub fn agents(&self) -> Option<&Mapping> {
        self.fields.get("agents").and_then(Value::as_mapping)
    }

    /// Look up an arbitrary attribute
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All attributes of the step
    pub fn fields(&self) -> &Mapping {
        &self.fields
    }
}

/// A named, ordered collection of steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    group: String,
    steps: Vec<Step>,
}

impl Group {
    pub fn new(label: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            group: label.into(),
            steps,
        }
    }

    /// The group label
    pub fn label(&self) -> &str {
        &self.group
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Give every step of the group the same label
    pub fn with_step_labels(mut self, label: &str) -> Self {
        for step in &mut self.steps {
            step.fields
                .insert("label".to_string(), Value::String(label.to_string()));
        }
        self
    }
}

/// A top-level pipeline entry
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEntry {
    Step(Step),
    Group(Group),
    /// Barrier: wait for every previous entry to finish
    Wait,
}

impl Serialize for PipelineEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PipelineEntry::Step(step) => step.serialize(serializer),
            PipelineEntry::Group(group) => group.serialize(serializer),
            PipelineEntry::Wait => serializer.serialize_str("wait"),
        }
    }
}

impl From<Step> for PipelineEntry {
    fn from(step: Step) -> Self {
        PipelineEntry::Step(step)
    }
}

impl From<Group> for PipelineEntry {
    fn from(group: Group) -> Self {
        PipelineEntry::Group(group)
    }
}

/// The visual marker at the start of a label
///
/// This is the first character plus any variation selectors right after
/// it, so `🏗️` keeps its emoji presentation.
pub fn label_marker(label: &str) -> &str {
    let mut chars = label.char_indices();
    if chars.next().is_none() {
        return "";
    }

    let end = chars
        .find(|(_, c)| !is_variation_selector(*c))
        .map(|(idx, _)| idx)
        .unwrap_or(label.len());
    &label[..end]
}

fn is_variation_selector(c: char) -> bool {
    matches!(c, '\u{FE00}'..='\u{FE0F}')
}
