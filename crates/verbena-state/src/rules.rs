//! Derived-value rules.
//!
//! Some fields are computed from others when they change. A rule takes the
//! current configuration and the patch an edit is about to apply, and returns
//! the patch with derived fields added, so the editor applies and emits the
//! whole thing as one step.

use serde_json::Value;
use verbena_config::ConfigMap;

#[derive(Debug, Clone, PartialEq)]
pub enum DerivedRule {
  /// Selecting a named preset in `preset_field` also writes the preset's value
  /// into `target_field`. Writing `target_field` by hand to a value other than
  /// the current preset's switches the preset to `custom`.
  Preset {
    preset_field: String,
    target_field: String,
    presets: Vec<(String, Value)>,
    custom: String,
  },
  /// A group of integer fields that always sums to `total`. Setting some of
  /// them redistributes what is left across the others, in proportion to their
  /// prior values.
  WeightGroup { fields: Vec<String>, total: u64 },
}

impl DerivedRule {
  pub fn preset(
    preset_field: impl Into<String>,
    target_field: impl Into<String>,
    presets: impl IntoIterator<Item = (String, Value)>,
    custom: impl Into<String>,
  ) -> Self {
    DerivedRule::Preset {
      preset_field: preset_field.into(),
      target_field: target_field.into(),
      presets: presets.into_iter().collect(),
      custom: custom.into(),
    }
  }

  pub fn weight_group<S: Into<String>>(fields: impl IntoIterator<Item = S>, total: u64) -> Self {
    DerivedRule::WeightGroup {
      fields: fields.into_iter().map(Into::into).collect(),
      total,
    }
  }

  /// Expand `patch` with the fields this rule derives from it.
  pub fn apply(&self, current: &ConfigMap, mut patch: ConfigMap) -> ConfigMap {
    match self {
      DerivedRule::Preset {
        preset_field,
        target_field,
        presets,
        custom,
      } => {
        let preset_value = |name: &str| {
          presets
            .iter()
            .find(|(preset, _)| preset == name)
            .map(|(_, value)| value.clone())
        };

        let selected = patch.get(preset_field).cloned();
        match (selected, patch.contains_key(target_field)) {
          (Some(selected), false) => {
            if let Some(value) = selected.as_str().and_then(preset_value) {
              patch.insert(target_field.clone(), value);
            }
          }
          (None, true) => {
            let active = current
              .get(preset_field)
              .and_then(Value::as_str)
              .and_then(preset_value);
            if let Some(active) = active
              && patch.get(target_field) != Some(&active)
            {
              patch.insert(preset_field.clone(), Value::String(custom.clone()));
            }
          }
          // Both written together: the caller chose both values.
          _ => {}
        }
        patch
      }
      DerivedRule::WeightGroup { fields, total } => {
        let mut pinned: Vec<(usize, u64)> = fields
          .iter()
          .enumerate()
          .filter_map(|(i, field)| {
            patch
              .get(field)
              .and_then(as_weight)
              .map(|v| (i, v.min(*total)))
          })
          .collect();
        if pinned.is_empty() {
          return patch;
        }

        let free: Vec<usize> = (0..fields.len())
          .filter(|i| !pinned.iter().any(|(p, _)| p == i))
          .collect();
        let pinned_sum: u64 = pinned.iter().map(|(_, v)| v).sum();

        // Pinned values alone cannot exceed the total, and with no free member
        // left they must meet it.
        if pinned_sum > *total || (free.is_empty() && pinned_sum != *total) {
          let values: Vec<u64> = pinned.iter().map(|(_, v)| *v).collect();
          for ((_, value), scaled) in pinned.iter_mut().zip(allocate(*total, &values)) {
            *value = scaled;
          }
        }
        let budget = total.saturating_sub(pinned.iter().map(|(_, v)| v).sum());

        for (i, value) in &pinned {
          patch.insert(fields[*i].clone(), Value::from(*value));
        }
        if free.is_empty() {
          return patch;
        }

        let prior: Vec<u64> = free
          .iter()
          .map(|i| current.get(&fields[*i]).and_then(as_weight).unwrap_or(0))
          .collect();
        for (i, value) in free.iter().zip(allocate(budget, &prior)) {
          patch.insert(fields[*i].clone(), Value::from(value));
        }
        patch
      }
    }
  }
}

/// Apply every rule in order.
pub fn expand(rules: &[DerivedRule], current: &ConfigMap, patch: ConfigMap) -> ConfigMap {
  rules
    .iter()
    .fold(patch, |patch, rule| rule.apply(current, patch))
}

/// Split `budget` across slots in proportion to `weights`, using
/// largest-remainder allocation so the parts always sum to exactly `budget`.
///
/// All-zero weights split evenly. Ties on the remainder go to the earlier slot.
pub fn allocate(budget: u64, weights: &[u64]) -> Vec<u64> {
  if weights.is_empty() {
    return Vec::new();
  }

  let uniform;
  let weights = if weights.iter().all(|w| *w == 0) {
    uniform = vec![1; weights.len()];
    &uniform
  } else {
    weights
  };
  let weight_sum: u128 = weights.iter().map(|w| *w as u128).sum();

  let mut parts = Vec::with_capacity(weights.len());
  let mut remainders = Vec::with_capacity(weights.len());
  for (i, w) in weights.iter().enumerate() {
    let scaled = budget as u128 * *w as u128;
    parts.push((scaled / weight_sum) as u64);
    remainders.push((scaled % weight_sum, i));
  }

  let assigned: u64 = parts.iter().sum();
  let leftover = (budget - assigned) as usize;
  // Largest remainder first, earlier index on ties.
  remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
  for (_, i) in remainders.into_iter().take(leftover) {
    parts[i] += 1;
  }
  parts
}

/// Read a slider value: non-negative numbers, rounded to the nearest integer.
fn as_weight(value: &Value) -> Option<u64> {
  if let Some(v) = value.as_u64() {
    return Some(v);
  }
  value
    .as_f64()
    .filter(|v| v.is_finite())
    .map(|v| v.max(0.0).round() as u64)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use verbena_config::object_from_value;

  fn obj(value: Value) -> ConfigMap {
    object_from_value(value).unwrap()
  }

  fn weights() -> DerivedRule {
    DerivedRule::weight_group(["a", "b", "c"], 100)
  }

  fn sum(map: &ConfigMap, fields: &[&str]) -> u64 {
    fields.iter().map(|f| map[*f].as_u64().unwrap()).sum()
  }

  fn schedule() -> DerivedRule {
    DerivedRule::preset(
      "preset",
      "cron",
      [
        ("hourly".to_string(), json!("0 * * * *")),
        ("daily".to_string(), json!("0 0 * * *")),
      ],
      "custom",
    )
  }

  #[test]
  fn test_allocate_preserves_ratio() {
    assert_eq!(allocate(50, &[30, 20]), vec![30, 20]);
    assert_eq!(allocate(25, &[30, 20]), vec![15, 10]);
  }

  #[test]
  fn test_allocate_exact_sum_with_rounding() {
    let parts = allocate(10, &[1, 1, 1]);
    assert_eq!(parts.iter().sum::<u64>(), 10);
    assert_eq!(parts, vec![4, 3, 3]);
  }

  #[test]
  fn test_allocate_zero_weights_split_evenly() {
    assert_eq!(allocate(7, &[0, 0]), vec![4, 3]);
  }

  #[test]
  fn test_allocate_zero_budget() {
    assert_eq!(allocate(0, &[5, 5]), vec![0, 0]);
  }

  #[test]
  fn test_weight_group_redistributes_remainder() {
    let current = obj(json!({ "a": 50, "b": 30, "c": 20 }));
    let patch = weights().apply(&current, obj(json!({ "a": 75 })));

    assert_eq!(patch["a"], 75);
    assert_eq!(patch["b"], 15);
    assert_eq!(patch["c"], 10);
  }

  #[test]
  fn test_weight_group_sum_is_exact_for_every_value() {
    let current = obj(json!({ "a": 50, "b": 33, "c": 17 }));
    for v in 0..=100u64 {
      let patch = weights().apply(&current, obj(json!({ "a": v })));
      assert_eq!(sum(&patch, &["a", "b", "c"]), 100, "a = {}", v);
    }
  }

  #[test]
  fn test_weight_group_no_drift_under_repeated_edits() {
    let rule = weights();
    let mut current = obj(json!({ "a": 34, "b": 33, "c": 33 }));
    for (field, v) in [("a", 17), ("b", 61), ("c", 3), ("a", 99), ("b", 1), ("c", 50)] {
      let mut edit = ConfigMap::new();
      edit.insert(field.to_string(), json!(v));
      let patch = rule.apply(&current, edit);
      current = verbena_config::merge(&current, &patch);
      assert_eq!(sum(&current, &["a", "b", "c"]), 100);
    }
  }

  #[test]
  fn test_weight_group_two_member_patch_over_total() {
    let current = obj(json!({ "a": 50, "b": 30, "c": 20 }));
    let patch = weights().apply(&current, obj(json!({ "a": 80, "b": 80 })));
    assert_eq!(patch, obj(json!({ "a": 50, "b": 50, "c": 0 })));
  }

  #[test]
  fn test_weight_group_two_member_patch_under_total() {
    let current = obj(json!({ "a": 50, "b": 30, "c": 20 }));
    let patch = weights().apply(&current, obj(json!({ "a": 40, "b": 20 })));
    assert_eq!(patch, obj(json!({ "a": 40, "b": 20, "c": 40 })));
  }

  #[test]
  fn test_weight_group_all_members_patch_is_rescaled() {
    let current = obj(json!({ "a": 50, "b": 30, "c": 20 }));

    let patch = weights().apply(&current, obj(json!({ "a": 10, "b": 10, "c": 10 })));
    assert_eq!(patch, obj(json!({ "a": 34, "b": 33, "c": 33 })));

    let patch = weights().apply(&current, obj(json!({ "a": 90, "b": 60, "c": 50 })));
    assert_eq!(sum(&patch, &["a", "b", "c"]), 100);
    assert_eq!(patch["a"], 45);

    let patch = weights().apply(&current, obj(json!({ "a": 60, "b": 25, "c": 15 })));
    assert_eq!(patch, obj(json!({ "a": 60, "b": 25, "c": 15 })));
  }

  #[test]
  fn test_weight_group_no_drift_under_multi_field_edits() {
    let rule = weights();
    let mut current = obj(json!({ "a": 34, "b": 33, "c": 33 }));
    for edit in [
      json!({ "a": 70, "b": 70 }),
      json!({ "b": 5, "c": 5 }),
      json!({ "a": 0, "b": 0, "c": 0 }),
      json!({ "a": 99, "c": 99 }),
      json!({ "a": 1, "b": 2, "c": 3 }),
    ] {
      let patch = rule.apply(&current, obj(edit));
      current = verbena_config::merge(&current, &patch);
      assert_eq!(sum(&current, &["a", "b", "c"]), 100);
    }
  }

  #[test]
  fn test_weight_group_clamps_and_rounds() {
    let current = obj(json!({ "a": 50, "b": 30, "c": 20 }));
    let patch = weights().apply(&current, obj(json!({ "a": 250 })));
    assert_eq!(patch["a"], 100);
    assert_eq!(patch["b"], 0);
    assert_eq!(patch["c"], 0);

    let patch = weights().apply(&current, obj(json!({ "a": 59.6 })));
    assert_eq!(patch["a"], 60);
    assert_eq!(sum(&patch, &["a", "b", "c"]), 100);
  }

  #[test]
  fn test_weight_group_ignores_non_numeric() {
    let current = obj(json!({ "a": 50, "b": 30, "c": 20 }));
    let patch = weights().apply(&current, obj(json!({ "a": "lots" })));
    assert_eq!(patch, obj(json!({ "a": "lots" })));
  }

  #[test]
  fn test_weight_group_untouched_when_not_in_patch() {
    let current = obj(json!({ "a": 50, "b": 30, "c": 20 }));
    let patch = weights().apply(&current, obj(json!({ "other": 1 })));
    assert_eq!(patch, obj(json!({ "other": 1 })));
  }

  #[test]
  fn test_preset_sets_target() {
    let current = obj(json!({ "preset": "daily", "cron": "0 0 * * *" }));
    let patch = schedule().apply(&current, obj(json!({ "preset": "hourly" })));
    assert_eq!(patch["cron"], "0 * * * *");
  }

  #[test]
  fn test_custom_preset_leaves_target() {
    let current = obj(json!({ "preset": "daily", "cron": "0 0 * * *" }));
    let patch = schedule().apply(&current, obj(json!({ "preset": "custom" })));
    assert!(!patch.contains_key("cron"));
  }

  #[test]
  fn test_hand_edited_target_switches_to_custom() {
    let current = obj(json!({ "preset": "daily", "cron": "0 0 * * *" }));
    let patch = schedule().apply(&current, obj(json!({ "cron": "*/5 * * * *" })));
    assert_eq!(patch["preset"], "custom");
  }

  #[test]
  fn test_target_matching_preset_keeps_preset() {
    let current = obj(json!({ "preset": "daily", "cron": "0 0 * * *" }));
    let patch = schedule().apply(&current, obj(json!({ "cron": "0 0 * * *" })));
    assert!(!patch.contains_key("preset"));
  }

  #[test]
  fn test_expand_applies_all_rules() {
    let current = obj(json!({ "preset": "daily", "cron": "0 0 * * *", "a": 50, "b": 30, "c": 20 }));
    let patch = expand(
      &[schedule(), weights()],
      &current,
      obj(json!({ "preset": "hourly", "b": 40 })),
    );
    assert_eq!(patch["cron"], "0 * * * *");
    assert_eq!(sum(&patch, &["a", "b", "c"]), 100);
  }
}
