//! Strongly-typed tool records.
//!
//! Each built-in tool has a record type whose `Default` value is the tool's
//! defaults record. The untyped editor state is parsed into these records with
//! [`ToolConfig::from_map`], which rejects unknown field names and wrongly typed
//! values instead of passing them through.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{
  AuthType, CodeLanguage, ConditionOperator, DatabaseOperation, DatabaseType, HttpMethod,
  LoopType, SchedulePreset,
};
use crate::error::ConfigError;
use crate::map::{ConfigMap, to_map};

/// Identifier of a built-in tool type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
  HttpRequest,
  Slack,
  Email,
  Database,
  Loop,
  Condition,
  Code,
  Llm,
  ScheduleTrigger,
  WebhookTrigger,
  SearchSettings,
}

impl ToolKind {
  pub const ALL: [ToolKind; 11] = [
    ToolKind::HttpRequest,
    ToolKind::Slack,
    ToolKind::Email,
    ToolKind::Database,
    ToolKind::Loop,
    ToolKind::Condition,
    ToolKind::Code,
    ToolKind::Llm,
    ToolKind::ScheduleTrigger,
    ToolKind::WebhookTrigger,
    ToolKind::SearchSettings,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ToolKind::HttpRequest => "http_request",
      ToolKind::Slack => "slack",
      ToolKind::Email => "email",
      ToolKind::Database => "database",
      ToolKind::Loop => "loop",
      ToolKind::Condition => "condition",
      ToolKind::Code => "code",
      ToolKind::Llm => "llm",
      ToolKind::ScheduleTrigger => "schedule_trigger",
      ToolKind::WebhookTrigger => "webhook_trigger",
      ToolKind::SearchSettings => "search_settings",
    }
  }

  /// The tool's defaults record as an untyped configuration object.
  pub fn defaults(self) -> ConfigMap {
    let config = match self {
      ToolKind::HttpRequest => ToolConfig::HttpRequest(HttpRequestConfig::default()),
      ToolKind::Slack => ToolConfig::Slack(SlackConfig::default()),
      ToolKind::Email => ToolConfig::Email(EmailConfig::default()),
      ToolKind::Database => ToolConfig::Database(DatabaseConfig::default()),
      ToolKind::Loop => ToolConfig::Loop(LoopConfig::default()),
      ToolKind::Condition => ToolConfig::Condition(ConditionConfig::default()),
      ToolKind::Code => ToolConfig::Code(CodeConfig::default()),
      ToolKind::Llm => ToolConfig::Llm(LlmConfig::default()),
      ToolKind::ScheduleTrigger => ToolConfig::ScheduleTrigger(ScheduleTriggerConfig::default()),
      ToolKind::WebhookTrigger => ToolConfig::WebhookTrigger(WebhookTriggerConfig::default()),
      ToolKind::SearchSettings => ToolConfig::SearchSettings(SearchSettingsConfig::default()),
    };
    // Records are plain structs of serializable fields; this cannot fail.
    config.to_map().unwrap_or_default()
  }
}

impl fmt::Display for ToolKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ToolKind {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ToolKind::ALL
      .into_iter()
      .find(|kind| kind.as_str() == s)
      .ok_or_else(|| ConfigError::UnknownTool(s.to_string()))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpRequestConfig {
  pub method: HttpMethod,
  pub url: String,
  pub headers: BTreeMap<String, String>,
  pub query_params: BTreeMap<String, String>,
  pub body: String,
  pub auth_type: AuthType,
  pub timeout_secs: u32,
  pub follow_redirects: bool,
}

impl Default for HttpRequestConfig {
  fn default() -> Self {
    Self {
      method: HttpMethod::Get,
      url: String::new(),
      headers: BTreeMap::new(),
      query_params: BTreeMap::new(),
      body: String::new(),
      auth_type: AuthType::None,
      timeout_secs: 30,
      follow_redirects: true,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlackConfig {
  pub webhook_url: String,
  pub channel: String,
  pub message: String,
  pub username: String,
  pub icon_emoji: String,
}

impl Default for SlackConfig {
  fn default() -> Self {
    Self {
      webhook_url: String::new(),
      channel: String::new(),
      message: String::new(),
      username: "Workflow Bot".to_string(),
      icon_emoji: ":robot_face:".to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailConfig {
  pub to: String,
  pub cc: String,
  pub subject: String,
  pub body: String,
  pub is_html: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
  pub db_type: DatabaseType,
  pub connection_string: String,
  pub operation: DatabaseOperation,
  pub query: String,
  pub timeout_secs: u32,
  pub max_rows: u32,
}

impl Default for DatabaseConfig {
  fn default() -> Self {
    Self {
      db_type: DatabaseType::Postgres,
      connection_string: String::new(),
      operation: DatabaseOperation::Select,
      query: String::new(),
      timeout_secs: 30,
      max_rows: 1000,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
  pub loop_type: LoopType,
  /// Path to the array to iterate over, for `for_each` loops.
  pub items_path: String,
  pub count: u32,
  /// Continuation expression, for `while` loops.
  pub condition: String,
  pub max_iterations: u32,
  pub parallel: bool,
  pub batch_size: u32,
}

impl Default for LoopConfig {
  fn default() -> Self {
    Self {
      loop_type: LoopType::ForEach,
      items_path: String::new(),
      count: 10,
      condition: String::new(),
      max_iterations: 100,
      parallel: false,
      batch_size: 1,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConditionConfig {
  pub expression: String,
  pub operator: ConditionOperator,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodeConfig {
  pub language: CodeLanguage,
  pub code: String,
  pub timeout_secs: u32,
}

impl Default for CodeConfig {
  fn default() -> Self {
    Self {
      language: CodeLanguage::Python,
      code: String::new(),
      timeout_secs: 30,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
  pub model: String,
  pub prompt: String,
  pub system_prompt: String,
  pub temperature: f64,
  pub max_tokens: u32,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      model: "gpt-4o-mini".to_string(),
      prompt: String::new(),
      system_prompt: String::new(),
      temperature: 0.7,
      max_tokens: 1024,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleTriggerConfig {
  pub preset: SchedulePreset,
  pub cron: String,
  pub timezone: String,
  pub enabled: bool,
}

impl Default for ScheduleTriggerConfig {
  fn default() -> Self {
    let preset = SchedulePreset::Daily;
    Self {
      preset,
      cron: preset.cron().unwrap_or_default().to_string(),
      timezone: "UTC".to_string(),
      enabled: true,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookTriggerConfig {
  pub path: String,
  pub method: HttpMethod,
  pub secret: String,
}

impl Default for WebhookTriggerConfig {
  fn default() -> Self {
    Self {
      path: String::new(),
      method: HttpMethod::Post,
      secret: String::new(),
    }
  }
}

/// Retrieval settings panel. The three weights are percentages that sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettingsConfig {
  pub semantic_weight: u32,
  pub keyword_weight: u32,
  pub recency_weight: u32,
  pub top_k: u32,
  pub similarity_threshold: f64,
  pub chunk_size: u32,
  pub chunk_overlap: u32,
}

impl Default for SearchSettingsConfig {
  fn default() -> Self {
    Self {
      semantic_weight: 50,
      keyword_weight: 30,
      recency_weight: 20,
      top_k: 10,
      similarity_threshold: 0.7,
      chunk_size: 512,
      chunk_overlap: 64,
    }
  }
}

/// A typed tool configuration, tagged by tool id when serialized whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolConfig {
  HttpRequest(HttpRequestConfig),
  Slack(SlackConfig),
  Email(EmailConfig),
  Database(DatabaseConfig),
  Loop(LoopConfig),
  Condition(ConditionConfig),
  Code(CodeConfig),
  Llm(LlmConfig),
  ScheduleTrigger(ScheduleTriggerConfig),
  WebhookTrigger(WebhookTriggerConfig),
  SearchSettings(SearchSettingsConfig),
}

impl ToolConfig {
  /// Parse an untyped configuration object as the record for `kind`.
  pub fn from_map(kind: ToolKind, map: &ConfigMap) -> Result<Self, ConfigError> {
    Ok(match kind {
      ToolKind::HttpRequest => ToolConfig::HttpRequest(parse_record(kind, map)?),
      ToolKind::Slack => ToolConfig::Slack(parse_record(kind, map)?),
      ToolKind::Email => ToolConfig::Email(parse_record(kind, map)?),
      ToolKind::Database => ToolConfig::Database(parse_record(kind, map)?),
      ToolKind::Loop => ToolConfig::Loop(parse_record(kind, map)?),
      ToolKind::Condition => ToolConfig::Condition(parse_record(kind, map)?),
      ToolKind::Code => ToolConfig::Code(parse_record(kind, map)?),
      ToolKind::Llm => ToolConfig::Llm(parse_record(kind, map)?),
      ToolKind::ScheduleTrigger => ToolConfig::ScheduleTrigger(parse_record(kind, map)?),
      ToolKind::WebhookTrigger => ToolConfig::WebhookTrigger(parse_record(kind, map)?),
      ToolKind::SearchSettings => ToolConfig::SearchSettings(parse_record(kind, map)?),
    })
  }

  pub fn kind(&self) -> ToolKind {
    match self {
      ToolConfig::HttpRequest(_) => ToolKind::HttpRequest,
      ToolConfig::Slack(_) => ToolKind::Slack,
      ToolConfig::Email(_) => ToolKind::Email,
      ToolConfig::Database(_) => ToolKind::Database,
      ToolConfig::Loop(_) => ToolKind::Loop,
      ToolConfig::Condition(_) => ToolKind::Condition,
      ToolConfig::Code(_) => ToolKind::Code,
      ToolConfig::Llm(_) => ToolKind::Llm,
      ToolConfig::ScheduleTrigger(_) => ToolKind::ScheduleTrigger,
      ToolConfig::WebhookTrigger(_) => ToolKind::WebhookTrigger,
      ToolConfig::SearchSettings(_) => ToolKind::SearchSettings,
    }
  }

  /// The record's fields as an untyped configuration object (without the tag).
  pub fn to_map(&self) -> Result<ConfigMap, ConfigError> {
    match self {
      ToolConfig::HttpRequest(c) => to_map(c),
      ToolConfig::Slack(c) => to_map(c),
      ToolConfig::Email(c) => to_map(c),
      ToolConfig::Database(c) => to_map(c),
      ToolConfig::Loop(c) => to_map(c),
      ToolConfig::Condition(c) => to_map(c),
      ToolConfig::Code(c) => to_map(c),
      ToolConfig::Llm(c) => to_map(c),
      ToolConfig::ScheduleTrigger(c) => to_map(c),
      ToolConfig::WebhookTrigger(c) => to_map(c),
      ToolConfig::SearchSettings(c) => to_map(c),
    }
  }
}

fn parse_record<T: DeserializeOwned>(kind: ToolKind, map: &ConfigMap) -> Result<T, ConfigError> {
  serde_json::from_value(Value::Object(map.clone())).map_err(|e| ConfigError::InvalidRecord {
    tool: kind.as_str().to_string(),
    message: e.to_string(),
  })
}
