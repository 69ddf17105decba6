//! Verbena Config
//!
//! This crate contains the configuration types for verbena tool nodes.
//!
//! A node's configuration crosses crate boundaries as an untyped [`ConfigMap`]
//! (the JSON object the builder stores). Every built-in tool also has a typed
//! record; [`ToolKind::defaults`] derives the defaults record from the record's
//! `Default`, and [`ToolConfig::from_map`] parses an edited map back into the
//! record, rejecting unknown fields and wrong value types.

mod enums;
mod error;
mod map;
mod tool;

pub use enums::{
  AuthType, CodeLanguage, ConditionOperator, DatabaseOperation, DatabaseType, HttpMethod,
  LoopType, SchedulePreset,
};
pub use error::ConfigError;
pub use map::{ConfigMap, is_blank, merge, object_from_value, to_map, value_kind};
pub use tool::{
  CodeConfig, ConditionConfig, DatabaseConfig, EmailConfig, HttpRequestConfig, LlmConfig,
  LoopConfig, ScheduleTriggerConfig, SearchSettingsConfig, SlackConfig, ToolConfig, ToolKind,
  WebhookTriggerConfig,
};
