//! Pipeline document and its JSON rendering

use crate::core::step::{Group, PipelineEntry, Step};
use serde::ser::Error as _;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// The ordered list of groups, steps and barriers for one CI run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pipeline {
    steps: Vec<PipelineEntry>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, group or barrier
    pub fn push(&mut self, entry: impl Into<PipelineEntry>) {
        self.steps.push(entry.into());
    }

    /// Append a synchronization barrier
    pub fn wait(&mut self) {
        self.steps.push(PipelineEntry::Wait);
    }

    pub fn entries(&self) -> &[PipelineEntry] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All groups, in pipeline order
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.steps.iter().filter_map(|entry| match entry {
            PipelineEntry::Group(group) => Some(group),
            _ => None,
        })
    }

    /// Find a group by label
    pub fn group(&self, label: &str) -> Option<&Group> {
        self.groups().find(|group| group.label() == label)
    }

    /// Labels of every top-level entry; barriers show up as `wait`
    pub fn outline(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(|entry| match entry {
                PipelineEntry::Step(step) => step.label().unwrap_or(""),
                PipelineEntry::Group(group) => group.label(),
                PipelineEntry::Wait => "wait",
            })
            .collect()
    }

    /// Every step, flattening groups
    pub fn all_steps(&self) -> Vec<&Step> {
        self.steps
            .iter()
            .flat_map(|entry| match entry {
                PipelineEntry::Step(step) => std::slice::from_ref(step),
                PipelineEntry::Group(group) => group.steps(),
                PipelineEntry::Wait => &[][..],
            })
            .collect()
    }

    /// Render the pipeline as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serialize(self)
    }
}

/// Render a pipeline as JSON with sorted keys and 4-space indentation
///
/// Non-ASCII characters (the emoji in labels) are written as-is.
pub fn serialize(pipeline: &Pipeline) -> serde_json::Result<String> {
    // Going through `serde_json::Value` sorts every object's keys
    let value = serde_json::to_value(pipeline)?;

    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;

    String::from_utf8(buf).map_err(serde_json::Error::custom)
}
