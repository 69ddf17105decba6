//! The static tool table.
//!
//! Lookups are plain scans over a compile-time table. An unknown id is not an
//! error: [`lookup`] returns `None` and [`resolve`] falls back to the generic
//! editor.

use tracing::debug;
use verbena_config::ToolKind;

use crate::entry::{Category, EditorRef, ToolEntry};

static TOOLS: &[ToolEntry] = &[
  ToolEntry {
    id: "schedule_trigger",
    name: "Schedule",
    description: "Start the workflow on a cron schedule",
    category: Category::Trigger,
    kind: ToolKind::ScheduleTrigger,
  },
  ToolEntry {
    id: "webhook_trigger",
    name: "Webhook",
    description: "Start the workflow from an incoming HTTP request",
    category: Category::Trigger,
    kind: ToolKind::WebhookTrigger,
  },
  ToolEntry {
    id: "http_request",
    name: "HTTP Request",
    description: "Call an HTTP endpoint",
    category: Category::Integration,
    kind: ToolKind::HttpRequest,
  },
  ToolEntry {
    id: "slack",
    name: "Slack",
    description: "Post a message to a Slack channel",
    category: Category::Integration,
    kind: ToolKind::Slack,
  },
  ToolEntry {
    id: "email",
    name: "Email",
    description: "Send an email",
    category: Category::Integration,
    kind: ToolKind::Email,
  },
  ToolEntry {
    id: "database",
    name: "Database",
    description: "Run a query against a database",
    category: Category::Data,
    kind: ToolKind::Database,
  },
  ToolEntry {
    id: "search_settings",
    name: "Search Settings",
    description: "Tune hybrid retrieval weights and chunking",
    category: Category::Data,
    kind: ToolKind::SearchSettings,
  },
  ToolEntry {
    id: "loop",
    name: "Loop",
    description: "Repeat the downstream nodes",
    category: Category::Logic,
    kind: ToolKind::Loop,
  },
  ToolEntry {
    id: "condition",
    name: "Condition",
    description: "Branch on an expression",
    category: Category::Logic,
    kind: ToolKind::Condition,
  },
  ToolEntry {
    id: "code",
    name: "Code",
    description: "Run a Python or JavaScript snippet",
    category: Category::Logic,
    kind: ToolKind::Code,
  },
  ToolEntry {
    id: "llm",
    name: "LLM",
    description: "Prompt a language model",
    category: Category::Ai,
    kind: ToolKind::Llm,
  },
];

/// Legacy ids still found in saved workflows.
static ALIASES: &[(&str, &str)] = &[
  ("http", "http_request"),
  ("cron", "schedule_trigger"),
  ("for_each", "loop"),
  ("sql", "database"),
];

/// Find the entry for a tool id (or one of its legacy aliases).
///
/// `None` is the not-found sentinel; callers render a generic editor.
pub fn lookup(tool_id: &str) -> Option<&'static ToolEntry> {
  let canonical = ALIASES
    .iter()
    .find(|(alias, _)| *alias == tool_id)
    .map_or(tool_id, |(_, target)| *target);

  TOOLS.iter().find(|entry| entry.id == canonical)
}

/// Find the entry for a typed tool kind.
pub fn lookup_kind(kind: ToolKind) -> Option<&'static ToolEntry> {
  TOOLS.iter().find(|entry| entry.kind == kind)
}

/// Resolve a tool id to the editor that should render it.
pub fn resolve(tool_id: &str) -> EditorRef {
  match lookup(tool_id) {
    Some(entry) => EditorRef::Tool(entry),
    None => {
      debug!(tool_id, "no dedicated editor, using generic editor");
      EditorRef::Generic {
        tool_id: tool_id.to_string(),
      }
    }
  }
}

/// All registered tools, in palette order.
pub fn entries() -> &'static [ToolEntry] {
  TOOLS
}

/// Registered tools grouped by category, in palette order. Empty categories are
/// omitted.
pub fn categories() -> Vec<(Category, Vec<&'static ToolEntry>)> {
  Category::ALL
    .into_iter()
    .map(|category| {
      let tools: Vec<&'static ToolEntry> =
        TOOLS.iter().filter(|e| e.category == category).collect();
      (category, tools)
    })
    .filter(|(_, tools)| !tools.is_empty())
    .collect()
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn test_lookup_miss_returns_none() {
    assert!(lookup("nonexistent_tool_id").is_none());
    assert!(lookup("").is_none());
  }

  #[test]
  fn test_every_kind_is_registered_once() {
    for kind in ToolKind::ALL {
      let entry = lookup_kind(kind).unwrap_or_else(|| panic!("{} not registered", kind));
      assert_eq!(entry.id, kind.as_str());
      assert_eq!(lookup(kind.as_str()), Some(entry));
    }

    let ids: HashSet<&str> = TOOLS.iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), TOOLS.len());
  }

  #[test]
  fn test_aliases_resolve_to_canonical_entry() {
    for (alias, target) in ALIASES {
      assert_eq!(lookup(alias).map(|e| e.id), Some(*target));
      assert!(lookup(target).is_some());
    }
  }

  #[test]
  fn test_resolve_unknown_falls_back_to_generic() {
    let editor = resolve("acme_crm");
    assert_eq!(
      editor,
      EditorRef::Generic {
        tool_id: "acme_crm".to_string()
      }
    );
    assert_eq!(editor.tool_id(), "acme_crm");
  }

  #[test]
  fn test_resolve_known_tool() {
    let EditorRef::Tool(entry) = resolve("slack") else {
      panic!("slack should have a dedicated editor");
    };
    assert_eq!(entry.name, "Slack");
  }

  #[test]
  fn test_categories_cover_all_entries() {
    let grouped = categories();
    let total: usize = grouped.iter().map(|(_, tools)| tools.len()).sum();
    assert_eq!(total, TOOLS.len());
    assert_eq!(grouped[0].0, Category::Trigger);
  }
}
