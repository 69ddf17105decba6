//! The explicit validation pass.
//!
//! Validation runs on demand (typically on save), never on every edit. It only
//! reads the configuration: failures come back as a list of messages for the
//! owner to display, and the state is left untouched.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use verbena_config::{ConfigMap, is_blank};

/// Default tolerance for [`ValidationRule::SumsTo`].
pub const SUM_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
  /// A numeric field must lie within `min..=max`.
  Range { field: String, min: f64, max: f64 },
  /// A group of numeric fields must sum to `total`, within `tolerance`.
  SumsTo {
    fields: Vec<String>,
    total: f64,
    tolerance: f64,
  },
  /// A numeric field must be strictly less than another.
  LessThan { field: String, other: String },
  /// A field must be filled in.
  Required { field: String },
}

impl ValidationRule {
  pub fn range(field: impl Into<String>, min: f64, max: f64) -> Self {
    ValidationRule::Range {
      field: field.into(),
      min,
      max,
    }
  }

  pub fn sums_to<S: Into<String>>(fields: impl IntoIterator<Item = S>, total: f64) -> Self {
    ValidationRule::SumsTo {
      fields: fields.into_iter().map(Into::into).collect(),
      total,
      tolerance: SUM_TOLERANCE,
    }
  }

  pub fn less_than(field: impl Into<String>, other: impl Into<String>) -> Self {
    ValidationRule::LessThan {
      field: field.into(),
      other: other.into(),
    }
  }

  pub fn required(field: impl Into<String>) -> Self {
    ValidationRule::Required {
      field: field.into(),
    }
  }

  fn check(&self, config: &ConfigMap) -> Option<ValidationError> {
    match self {
      ValidationRule::Range { field, min, max } => match number(config, field) {
        Some(v) if v >= *min && v <= *max => None,
        Some(_) => Some(ValidationError::field(
          field,
          format!("{} must be between {} and {}", label(field), min, max),
        )),
        None => Some(ValidationError::field(
          field,
          format!("{} must be a number", label(field)),
        )),
      },
      ValidationRule::SumsTo {
        fields,
        total,
        tolerance,
      } => {
        let mut sum = 0.0;
        for field in fields {
          match number(config, field) {
            Some(v) => sum += v,
            None => {
              return Some(ValidationError::field(
                field,
                format!("{} must be a number", label(field)),
              ));
            }
          }
        }
        if (sum - total).abs() <= *tolerance {
          None
        } else {
          let names: Vec<String> = fields.iter().map(|f| label(f)).collect();
          Some(ValidationError::general(format!(
            "{} must add up to {} (currently {})",
            names.join(", "),
            total,
            sum
          )))
        }
      }
      ValidationRule::LessThan { field, other } => {
        match (number(config, field), number(config, other)) {
          (Some(a), Some(b)) if a < b => None,
          (Some(_), Some(_)) => Some(ValidationError::field(
            field,
            format!("{} must be less than {}", label(field), label(other)),
          )),
          // Non-numeric values are reported by the range rules, if any.
          _ => None,
        }
      }
      ValidationRule::Required { field } => match config.get(field) {
        Some(value) if !is_blank(value) => None,
        _ => Some(ValidationError::field(
          field,
          format!("{} is required", label(field)),
        )),
      },
    }
  }
}

/// A validation failure, optionally tied to a field for inline display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
  pub message: String,
}

impl ValidationError {
  pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      field: Some(field.into()),
      message: message.into(),
    }
  }

  pub fn general(message: impl Into<String>) -> Self {
    Self {
      field: None,
      message: message.into(),
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.message)
  }
}

/// Run every rule against `config`, collecting failures in rule order.
pub fn validate(config: &ConfigMap, rules: &[ValidationRule]) -> Vec<ValidationError> {
  rules.iter().filter_map(|rule| rule.check(config)).collect()
}

fn number(config: &ConfigMap, field: &str) -> Option<f64> {
  config.get(field).and_then(Value::as_f64)
}

/// "chunk_overlap" -> "Chunk overlap"
fn label(field: &str) -> String {
  let spaced = field.replace('_', " ");
  let mut chars = spaced.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
