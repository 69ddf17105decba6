//! Untyped configuration objects and shallow merging.
//!
//! A configuration object is a JSON object keyed by field name. Merging is
//! shallow and right-biased: a key in the overlay replaces the same key in the
//! base wholesale, nested objects included.
//!
//! ```json
//! base:    { "method": "GET", "headers": { "a": "1" } }
//! overlay: { "headers": { "b": "2" } }
//! merged:  { "method": "GET", "headers": { "b": "2" } }
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;

/// A configuration object: field name to JSON value.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Shallow right-biased merge of `overlay` on top of `base`.
pub fn merge(base: &ConfigMap, overlay: &ConfigMap) -> ConfigMap {
  let mut merged = base.clone();
  for (key, value) in overlay {
    merged.insert(key.clone(), value.clone());
  }
  merged
}

/// Serialize a typed record into a configuration object.
pub fn to_map<T: Serialize>(record: &T) -> Result<ConfigMap, ConfigError> {
  match serde_json::to_value(record)? {
    Value::Object(map) => Ok(map),
    other => Err(ConfigError::NotAnObject {
      found: value_kind(&other),
    }),
  }
}

/// Interpret an arbitrary JSON value as a configuration object.
///
/// `null` is treated as an empty object, matching how an editor is opened for a
/// freshly dropped node that has no data yet.
pub fn object_from_value(value: Value) -> Result<ConfigMap, ConfigError> {
  match value {
    Value::Object(map) => Ok(map),
    Value::Null => Ok(ConfigMap::new()),
    other => Err(ConfigError::NotAnObject {
      found: value_kind(&other),
    }),
  }
}

/// Whether a value counts as "not filled in" for required-field checks.
pub fn is_blank(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.trim().is_empty(),
    Value::Array(items) => items.is_empty(),
    Value::Object(map) => map.is_empty(),
    Value::Bool(_) | Value::Number(_) => false,
  }
}

/// Human-readable JSON type name, used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
