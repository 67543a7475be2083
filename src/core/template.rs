//! Placeholder interpolation for step templates
//!
//! Templates use `{name}` placeholders. `{{` and `}}` stand for literal
//! braces, so shell brace expansions can be written as
//! `integration_tests/{{functional,security}}`.
//!
//! Only bare names are substituted; a conversion or format spec such as
//! `{instance!r}` or `{instance:>5}` is rejected.

use crate::core::value::{Mapping, Value};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Substitution variables available to a template
pub type Variables = BTreeMap<String, String>;

/// Errors raised while rendering a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template references unknown variable '{name}': {template}")]
    MissingVariable { name: String, template: String },

    #[error("unbalanced '{brace}' in template: {template}")]
    UnbalancedBrace { brace: char, template: String },

    #[error("placeholder '{placeholder}' uses a conversion or format spec, only bare names are supported: {template}")]
    UnsupportedFormat { placeholder: String, template: String },
}

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("placeholder pattern is valid")
});

/// Render a single template string
pub fn render(template: &str, variables: &Variables) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;

    for caps in TOKEN.captures_iter(template) {
        let Some(token) = caps.get(0) else { continue };
        rendered.push_str(&template[last..token.start()]);
        rendered.push_str(&resolve(&caps, template, variables)?);
        last = token.end();
    }
    rendered.push_str(&template[last..]);

    Ok(rendered)
}

fn resolve(caps: &Captures<'_>, template: &str, variables: &Variables) -> Result<String, TemplateError> {
    if let Some(name) = caps.get(1) {
        if name.as_str().contains([':', '!']) {
            return Err(TemplateError::UnsupportedFormat {
                placeholder: name.as_str().to_string(),
                template: template.to_string(),
            });
        }
        return variables
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| TemplateError::MissingVariable {
                name: name.as_str().to_string(),
                template: template.to_string(),
            });
    }

    match caps.get(0).map_or("", |m| m.as_str()) {
        "{{" => Ok("{".to_string()),
        "}}" => Ok("}".to_string()),
        lone => Err(TemplateError::UnbalancedBrace {
            brace: lone.chars().next().unwrap_or('{'),
            template: template.to_string(),
        }),
    }
}

/// Interpolate variables into a value
///
/// Strings are rendered, mappings are walked recursively (keys untouched),
/// everything else is returned unchanged.
pub fn interpolate(value: &Value, variables: &Variables) -> Result<Value, TemplateError> {
    match value {
        Value::String(s) => render(s, variables).map(Value::String),
        Value::Mapping(map) => interpolate_mapping(map, variables).map(Value::Mapping),
        other => Ok(other.clone()),
    }
}

/// Interpolate every value of a mapping
pub fn interpolate_mapping(map: &Mapping, variables: &Variables) -> Result<Mapping, TemplateError> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), interpolate(value, variables)?)))
        .collect()
}
