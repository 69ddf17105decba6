//! Dynamic tool schemas.
//!
//! Tools without a dedicated editor describe their configuration with a JSON
//! Schema subset fetched from the backend:
//!
//! ```json
//! {
//!   "title": "Acme CRM",
//!   "properties": {
//!     "api_key": { "type": "string", "title": "API key" },
//!     "page_size": { "type": "integer", "minimum": 1, "maximum": 500, "default": 50 },
//!     "region": { "type": "string", "enum": ["us", "eu"], "default": "us" }
//!   },
//!   "required": ["api_key"]
//! }
//! ```
//!
//! The generic editor seeds its defaults from the schema and reports
//! field-level errors keyed by field name, for inline display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use verbena_config::{ConfigMap, is_blank};

/// Field-level errors: field name to message.
pub type FieldErrors = BTreeMap<String, String>;

/// JSON Schema type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
  String,
  Number,
  Integer,
  Boolean,
  Null,
  Array,
  Object,
}

impl SchemaType {
  /// Unknown type names are treated as strings.
  pub fn parse(type_str: &str) -> Self {
    match type_str {
      "string" => SchemaType::String,
      "number" => SchemaType::Number,
      "integer" => SchemaType::Integer,
      "boolean" => SchemaType::Boolean,
      "null" => SchemaType::Null,
      "array" => SchemaType::Array,
      "object" => SchemaType::Object,
      _ => SchemaType::String,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      SchemaType::String => "string",
      SchemaType::Number => "number",
      SchemaType::Integer => "integer",
      SchemaType::Boolean => "boolean",
      SchemaType::Null => "null",
      SchemaType::Array => "array",
      SchemaType::Object => "object",
    }
  }

  /// Whether `value` is of this type.
  fn accepts(self, value: &Value) -> bool {
    match self {
      SchemaType::String => value.is_string(),
      SchemaType::Number => value.is_number(),
      SchemaType::Integer => {
        value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
      }
      SchemaType::Boolean => value.is_boolean(),
      SchemaType::Null => value.is_null(),
      SchemaType::Array => value.is_array(),
      SchemaType::Object => value.is_object(),
    }
  }

  /// The value a field of this type starts with when the schema gives no default.
  fn zero(self) -> Value {
    match self {
      SchemaType::String => Value::String(String::new()),
      SchemaType::Number | SchemaType::Integer => Value::from(0),
      SchemaType::Boolean => Value::Bool(false),
      SchemaType::Null => Value::Null,
      SchemaType::Array => Value::Array(Vec::new()),
      SchemaType::Object => Value::Object(ConfigMap::new()),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub type_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub minimum: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub maximum: Option<f64>,
  #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
  pub allowed: Option<Vec<Value>>,
}

impl FieldSchema {
  /// Declared type; fields without one are strings.
  pub fn schema_type(&self) -> SchemaType {
    self
      .type_name
      .as_deref()
      .map_or(SchemaType::String, SchemaType::parse)
  }

  fn label<'a>(&'a self, name: &'a str) -> &'a str {
    self.title.as_deref().unwrap_or(name)
  }

  fn check(&self, name: &str, value: &Value) -> Option<String> {
    let label = self.label(name);
    let schema_type = self.schema_type();

    if !schema_type.accepts(value) {
      let type_name = schema_type.as_str();
      let article = if type_name.starts_with(['a', 'i', 'o']) { "an" } else { "a" };
      return Some(format!("{} must be {} {}", label, article, type_name));
    }

    if let Some(n) = value.as_f64() {
      if let Some(min) = self.minimum
        && n < min
      {
        return Some(format!("{} must be at least {}", label, min));
      }
      if let Some(max) = self.maximum
        && n > max
      {
        return Some(format!("{} must be at most {}", label, max));
      }
    }

    if let Some(allowed) = &self.allowed
      && !allowed.contains(value)
    {
      let options: Vec<String> = allowed
        .iter()
        .map(|v| match v {
          Value::String(s) => s.clone(),
          other => other.to_string(),
        })
        .collect();
      return Some(format!("{} must be one of: {}", label, options.join(", ")));
    }

    None
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default)]
  pub properties: BTreeMap<String, FieldSchema>,
  #[serde(default)]
  pub required: Vec<String>,
}

impl ToolSchema {
  /// Defaults record for the generic editor: each property's `default`, or the
  /// zero value of its type.
  pub fn defaults(&self) -> ConfigMap {
    self
      .properties
      .iter()
      .map(|(name, field)| {
        let value = field
          .default
          .clone()
          .unwrap_or_else(|| field.schema_type().zero());
        (name.clone(), value)
      })
      .collect()
  }

  /// Check a configuration against the schema.
  ///
  /// Keys the schema does not describe are ignored. Blank optional fields are
  /// not checked further.
  pub fn validate(&self, config: &ConfigMap) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for name in &self.required {
      if config.get(name).is_none_or(is_blank) {
        let label = self
          .properties
          .get(name)
          .map_or(name.as_str(), |f| f.label(name));
        errors.insert(name.clone(), format!("{} is required", label));
      }
    }

    for (name, field) in &self.properties {
      if errors.contains_key(name) {
        continue;
      }
      let Some(value) = config.get(name) else {
        continue;
      };
      if is_blank(value) {
        continue;
      }
      if let Some(message) = field.check(name, value) {
        errors.insert(name.clone(), message);
      }
    }

    errors
  }
}
