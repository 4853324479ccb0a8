//! Prompt template rendering.
//!
//! Templates are plain text with `{{name}}` placeholders. A placeholder may
//! walk into nested objects with dots (`{{profile.city}}`). Values render as:
//!
//! - strings verbatim
//! - numbers and booleans in their JSON form
//! - `null` as an empty string
//! - arrays as their rendered elements joined with `", "`
//! - objects as compact JSON

use lakshya_error::TemplateError;
use lakshya_interface::PromptRenderer;
use lakshya_rate_limit::LakshyaConfig;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, instrument};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
        .expect("Valid placeholder regex")
});

/// Renderer over a fixed set of templates.
///
/// # Examples
///
/// ```
/// use lakshya_flows::TemplateRenderer;
/// use lakshya_interface::PromptRenderer;
/// use serde_json::json;
///
/// let renderer = TemplateRenderer::new()
///     .with_template("greeting", "Hello {{profile.name}}, you like {{profile.interests}}.");
///
/// let text = renderer
///     .render("greeting", &json!({"profile": {"name": "Asha", "interests": ["biology", "art"]}}))
///     .unwrap();
/// assert_eq!(text, "Hello Asha, you like biology, art.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    templates: HashMap<String, String>,
}

impl TemplateRenderer {
    /// Renderer with no templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer holding every template from the configuration.
    pub fn from_config(config: &LakshyaConfig) -> Self {
        Self {
            templates: config
                .templates
                .iter()
                .map(|(id, template)| (id.clone(), template.text.clone()))
                .collect(),
        }
    }

    /// Add or replace a template.
    pub fn with_template(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(id.into(), text.into());
        self
    }

    /// Whether `id` is known.
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }
}

impl PromptRenderer for TemplateRenderer {
    #[instrument(skip(self, variables))]
    fn render(&self, template_id: &str, variables: &Value) -> Result<String, TemplateError> {
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| TemplateError::new(template_id, "template not found"))?;
        let rendered = render_template(template_id, template, variables)?;
        debug!(length = rendered.len(), "Rendered prompt");
        Ok(rendered)
    }
}

/// Substitute every placeholder in `template` from `variables`.
///
/// # Errors
///
/// Returns an error naming the first placeholder with no value.
pub fn render_template(
    template_id: &str,
    template: &str,
    variables: &Value,
) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len());
    let mut last = 0;
    for cap in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(reference)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let value = reference
            .as_str()
            .split('.')
            .try_fold(variables, |current, key| current.get(key))
            .ok_or_else(|| {
                TemplateError::new(
                    template_id,
                    format!("no value for placeholder '{}'", reference.as_str()),
                )
            })?;

        result.push_str(&template[last..whole.start()]);
        result.push_str(&render_value(value));
        last = whole.end();
    }
    result.push_str(&template[last..]);

    Ok(result)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
