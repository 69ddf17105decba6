use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
  #[default]
  Get,
  Post,
  Put,
  Patch,
  Delete,
  Head,
  Options,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
  #[default]
  None,
  Basic,
  Bearer,
  ApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseType {
  #[default]
  Postgres,
  Mysql,
  Sqlite,
  Mongodb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseOperation {
  #[default]
  Select,
  Insert,
  Update,
  Delete,
  Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopType {
  #[default]
  ForEach,
  Count,
  While,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
  #[default]
  Equals,
  NotEquals,
  Contains,
  GreaterThan,
  LessThan,
  IsEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeLanguage {
  #[default]
  Python,
  Javascript,
}

/// Named schedules offered by the schedule trigger.
///
/// `Custom` means the cron expression was typed by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePreset {
  EveryMinute,
  Hourly,
  #[default]
  Daily,
  Weekly,
  Monthly,
  Custom,
}

impl SchedulePreset {
  pub const ALL: [SchedulePreset; 6] = [
    SchedulePreset::EveryMinute,
    SchedulePreset::Hourly,
    SchedulePreset::Daily,
    SchedulePreset::Weekly,
    SchedulePreset::Monthly,
    SchedulePreset::Custom,
  ];

  /// Wire name, as stored in the `preset` field.
  pub fn as_str(self) -> &'static str {
    match self {
      SchedulePreset::EveryMinute => "every_minute",
      SchedulePreset::Hourly => "hourly",
      SchedulePreset::Daily => "daily",
      SchedulePreset::Weekly => "weekly",
      SchedulePreset::Monthly => "monthly",
      SchedulePreset::Custom => "custom",
    }
  }

  /// The cron expression a preset stands for. `Custom` has none.
  pub fn cron(self) -> Option<&'static str> {
    match self {
      SchedulePreset::EveryMinute => Some("* * * * *"),
      SchedulePreset::Hourly => Some("0 * * * *"),
      SchedulePreset::Daily => Some("0 0 * * *"),
      SchedulePreset::Weekly => Some("0 0 * * 0"),
      SchedulePreset::Monthly => Some("0 0 1 * *"),
      SchedulePreset::Custom => None,
    }
  }
}
