use std::sync::Arc;

use serde::Serialize;
use verbena_config::{ConfigMap, ToolKind};
use verbena_state::{ChangeNotifier, ConfigEditor, ToolSpec, ValidationPolicy};

use crate::spec::spec_for;

/// Palette section a tool is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Trigger,
  Integration,
  Data,
  Logic,
  Ai,
}

impl Category {
  pub const ALL: [Category; 5] = [
    Category::Trigger,
    Category::Integration,
    Category::Data,
    Category::Logic,
    Category::Ai,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Trigger => "trigger",
      Category::Integration => "integration",
      Category::Data => "data",
      Category::Logic => "logic",
      Category::Ai => "ai",
    }
  }
}

/// A registered tool and the editor that configures it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolEntry {
  /// Tool id, e.g. "http_request"
  pub id: &'static str,

  /// Display name, e.g. "HTTP Request"
  pub name: &'static str,

  /// Short description for the node palette
  pub description: &'static str,

  pub category: Category,

  /// Typed record the editor produces
  pub kind: ToolKind,
}

impl ToolEntry {
  /// The editor specification: defaults, derived rules, validation, test gating.
  pub fn spec(&self) -> ToolSpec {
    spec_for(self.kind)
  }

  /// Open an editor for a node of this tool.
  pub fn open<N: ChangeNotifier>(&self, data: &ConfigMap, notifier: N) -> ConfigEditor<N> {
    ConfigEditor::with_notifier(Arc::new(self.spec()), data, notifier)
  }
}

/// What the node inspector should render for a tool id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorRef {
  /// A dedicated editor from the registry.
  Tool(&'static ToolEntry),
  /// No dedicated editor: render the schema-driven generic editor.
  Generic { tool_id: String },
}

impl EditorRef {
  pub fn tool_id(&self) -> &str {
    match self {
      EditorRef::Tool(entry) => entry.id,
      EditorRef::Generic { tool_id } => tool_id,
    }
  }
}

/// Spec for a tool without a dedicated editor.
///
/// Defaults come from the tool's fetched schema; validation happens remotely.
pub fn generic_spec(tool_id: impl Into<String>, defaults: ConfigMap) -> ToolSpec {
  let mut spec = ToolSpec::new(tool_id, defaults);
  spec.policy = ValidationPolicy::Remote;
  spec
}
