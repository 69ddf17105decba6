//! Per-tool editor specifications.

use serde_json::Value;
use verbena_config::{SchedulePreset, ToolKind};
use verbena_state::{DerivedRule, ToolSpec, ValidationPolicy, ValidationRule};

/// The three retrieval weights of the search settings panel.
pub const SEARCH_WEIGHTS: [&str; 3] = ["semantic_weight", "keyword_weight", "recency_weight"];

/// Build the editor spec for a built-in tool.
pub fn spec_for(kind: ToolKind) -> ToolSpec {
  let mut spec = ToolSpec::new(kind.as_str(), kind.defaults());

  match kind {
    ToolKind::HttpRequest => {
      spec.validation = vec![
        ValidationRule::required("url"),
        ValidationRule::range("timeout_secs", 1.0, 300.0),
      ];
      spec.required_for_test = fields(["url"]);
    }
    ToolKind::Slack => {
      spec.validation = vec![
        ValidationRule::required("webhook_url"),
        ValidationRule::required("message"),
      ];
      spec.required_for_test = fields(["webhook_url", "message"]);
    }
    ToolKind::Email => {
      spec.validation = vec![
        ValidationRule::required("to"),
        ValidationRule::required("subject"),
      ];
      spec.required_for_test = fields(["to"]);
    }
    ToolKind::Database => {
      spec.validation = vec![
        ValidationRule::required("connection_string"),
        ValidationRule::required("query"),
        ValidationRule::range("timeout_secs", 1.0, 300.0),
        ValidationRule::range("max_rows", 1.0, 100_000.0),
      ];
      spec.required_for_test = fields(["connection_string", "query"]);
    }
    ToolKind::Loop => {
      spec.validation = vec![
        ValidationRule::range("count", 0.0, 10_000.0),
        ValidationRule::range("max_iterations", 1.0, 10_000.0),
        ValidationRule::range("batch_size", 1.0, 1_000.0),
      ];
    }
    ToolKind::Condition => {
      spec.validation = vec![ValidationRule::required("expression")];
    }
    ToolKind::Code => {
      spec.validation = vec![
        ValidationRule::required("code"),
        ValidationRule::range("timeout_secs", 1.0, 300.0),
      ];
      spec.required_for_test = fields(["code"]);
    }
    ToolKind::Llm => {
      spec.validation = vec![
        ValidationRule::required("model"),
        ValidationRule::required("prompt"),
        ValidationRule::range("temperature", 0.0, 2.0),
        ValidationRule::range("max_tokens", 1.0, 128_000.0),
      ];
      spec.required_for_test = fields(["prompt"]);
    }
    ToolKind::ScheduleTrigger => {
      let presets = SchedulePreset::ALL.into_iter().filter_map(|preset| {
        preset
          .cron()
          .map(|cron| (preset.as_str().to_string(), Value::from(cron)))
      });
      spec.derived = vec![DerivedRule::preset(
        "preset",
        "cron",
        presets,
        SchedulePreset::Custom.as_str(),
      )];
      spec.validation = vec![
        ValidationRule::required("cron"),
        ValidationRule::required("timezone"),
      ];
    }
    ToolKind::WebhookTrigger => {
      spec.validation = vec![ValidationRule::required("path")];
    }
    ToolKind::SearchSettings => {
      spec.derived = vec![DerivedRule::weight_group(SEARCH_WEIGHTS, 100)];
      spec.validation = vec![
        ValidationRule::range("top_k", 1.0, 100.0),
        ValidationRule::range("similarity_threshold", 0.0, 1.0),
        ValidationRule::sums_to(SEARCH_WEIGHTS, 100.0),
        ValidationRule::range("chunk_size", 64.0, 8192.0),
        ValidationRule::less_than("chunk_overlap", "chunk_size"),
      ];
      spec.policy = ValidationPolicy::OnSave;
    }
  }

  spec
}

fn fields<const N: usize>(names: [&str; N]) -> Vec<String> {
  names.iter().map(|n| n.to_string()).collect()
}
