//! Widget resolution for schema properties.
//!
//! The editor maps each schema property to a UI widget kind. Resolution
//! runs over an explicit ordered rule list built once at startup and
//! passed to consumers by reference: first match wins, and registering a
//! rule prepends it so specific rules beat the catch-all default. There
//! is no global mutable registry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Known widget kinds. `Custom` carries any other widget id, so plugins
/// can introduce kinds the core does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    StandardInput,
    CodeEditor,
    MarkdownViewer,
    #[serde(untagged)]
    Custom(String),
}

impl WidgetKind {
    pub fn id(&self) -> &str {
        match self {
            WidgetKind::StandardInput => "standard-input",
            WidgetKind::CodeEditor => "code-editor",
            WidgetKind::MarkdownViewer => "markdown-viewer",
            WidgetKind::Custom(id) => id,
        }
    }
}

type WidgetPredicate = Box<dyn Fn(&str, &Value) -> bool + Send + Sync>;

/// One resolution rule: a predicate over `(property name, property
/// schema)` and the widget to use when it matches.
pub struct WidgetRule {
    predicate: WidgetPredicate,
    widget: WidgetKind,
}

impl WidgetRule {
    pub fn new(
        predicate: impl Fn(&str, &Value) -> bool + Send + Sync + 'static,
        widget: WidgetKind,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            widget,
        }
    }
}

/// Ordered list of widget rules.
pub struct WidgetRegistry {
    rules: Vec<WidgetRule>,
}

impl WidgetRegistry {
    /// An empty registry with only the match-all standard-input fallback.
    pub fn new() -> Self {
        Self {
            rules: vec![WidgetRule::new(|_, _| true, WidgetKind::StandardInput)],
        }
    }

    /// The built-in rule set: code editor for `format: "code"` schemas,
    /// markdown viewer for `format: "markdown"`, standard input for
    /// everything else.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(WidgetRule::new(|_, schema| format_is(schema, "markdown"), WidgetKind::MarkdownViewer));
        registry.register(WidgetRule::new(|_, schema| format_is(schema, "code"), WidgetKind::CodeEditor));
        registry
    }

    /// Prepend a rule so it takes precedence over existing ones.
    pub fn register(
        &mut self,
        rule: WidgetRule,
    ) {
        self.rules.insert(0, rule);
    }

    /// Resolve the widget for a property; first matching rule wins.
    pub fn resolve(
        &self,
        property: &str,
        schema: &Value,
    ) -> WidgetKind {
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(property, schema))
            .map(|rule| rule.widget.clone())
            .unwrap_or(WidgetKind::StandardInput)
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn format_is(
    schema: &Value,
    format: &str,
) -> bool {
    schema.get("format").and_then(Value::as_str) == Some(format)
}
