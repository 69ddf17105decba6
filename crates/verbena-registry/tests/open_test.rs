//! Opening editors through the registry.

use std::sync::{Arc, Mutex};

use serde_json::json;
use verbena_config::{ConfigMap, ToolKind, object_from_value};
use verbena_registry::{SEARCH_WEIGHTS, generic_spec, lookup};
use verbena_state::{ConfigEditor, FnNotifier, NoopNotifier, ValidationPolicy};

#[test]
fn test_open_seeds_from_defaults_and_data() {
  let entry = lookup("http_request").expect("registered");
  let data = object_from_value(json!({ "url": "https://api.example.com", "method": "POST" })).unwrap();

  let editor = entry.open(&data, NoopNotifier);

  assert_eq!(editor.get("url"), Some(&json!("https://api.example.com")));
  assert_eq!(editor.get("method"), Some(&json!("POST")));
  assert_eq!(editor.get("timeout_secs"), Some(&json!(30)));
  assert!(editor.can_test());
}

#[test]
fn test_schedule_preset_through_registry() {
  let seen = Arc::new(Mutex::new(Vec::new()));
  let sink = seen.clone();
  let mut editor = lookup("cron").expect("alias").open(
    &ConfigMap::new(),
    FnNotifier::new(move |change| sink.lock().unwrap().push(change)),
  );

  editor.update_field("preset", json!("weekly"));

  let seen = seen.lock().unwrap();
  assert_eq!(seen.len(), 1);
  assert_eq!(seen[0].config["cron"], "0 0 * * 0");
  assert_eq!(seen[0].config["preset"], "weekly");
}

#[test]
fn test_search_settings_weights_always_sum_to_100() {
  let mut editor = lookup("search_settings")
    .expect("registered")
    .open(&ConfigMap::new(), NoopNotifier);

  for (field, value) in [
    ("semantic_weight", 90),
    ("recency_weight", 45),
    ("keyword_weight", 0),
    ("semantic_weight", 33),
  ] {
    editor.update_field(field, json!(value));
    let sum: u64 = SEARCH_WEIGHTS
      .iter()
      .map(|f| editor.get(f).and_then(|v| v.as_u64()).unwrap())
      .sum();
    assert_eq!(sum, 100);
    assert!(editor.validate().is_empty());
  }
}

#[test]
fn test_search_settings_multi_weight_patches_sum_to_100() {
  let mut editor = lookup("search_settings")
    .expect("registered")
    .open(&ConfigMap::new(), NoopNotifier);

  for patch in [
    json!({ "semantic_weight": 80, "keyword_weight": 80 }),
    json!({ "semantic_weight": 10, "keyword_weight": 10, "recency_weight": 10 }),
    json!({ "keyword_weight": 25, "recency_weight": 5 }),
  ] {
    editor.update_fields(object_from_value(patch).unwrap());
    let sum: u64 = SEARCH_WEIGHTS
      .iter()
      .map(|f| editor.get(f).and_then(|v| v.as_u64()).unwrap())
      .sum();
    assert_eq!(sum, 100);
    assert!(editor.validate().is_empty());
  }
  assert_eq!(editor.get("semantic_weight"), Some(&json!(70)));
}

#[test]
fn test_search_settings_validation_reports_cross_field() {
  let mut editor = lookup("search_settings")
    .expect("registered")
    .open(&ConfigMap::new(), NoopNotifier);
  editor.update_field("chunk_overlap", json!(1024));

  let errors = editor.validate();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].field.as_deref(), Some("chunk_overlap"));
}

#[test]
fn test_typed_view_for_every_registered_tool() {
  for kind in ToolKind::ALL {
    let editor = lookup(kind.as_str())
      .expect("registered")
      .open(&ConfigMap::new(), NoopNotifier);
    assert_eq!(editor.typed().unwrap().kind(), kind);
  }
}

#[test]
fn test_generic_spec_validates_remotely() {
  let defaults = object_from_value(json!({ "api_key": "" })).unwrap();
  let spec = generic_spec("acme_crm", defaults);
  assert_eq!(spec.policy, ValidationPolicy::Remote);

  let editor = ConfigEditor::new(Arc::new(spec), &ConfigMap::new());
  assert_eq!(editor.get("api_key"), Some(&json!("")));
  assert!(editor.typed().is_err());
}
