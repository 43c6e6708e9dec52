use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono::Weekday;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::datetime::week_start_from_name;
use crate::layout::{
  DEFAULT_CENTER_MIN_SPAN,
  DEFAULT_DAY_CAP,
  DEFAULT_LANE_BASE_OFFSET,
  DEFAULT_LANE_STEP,
  LayoutPolicy
};

const CONFIG_ENV_VAR: &str =
  "TWOGETHER_CONFIG";
const APP_DIR: &str = "twogether";

fn default_base_url() -> String {
  "http://localhost:8080".to_string()
}

fn default_diary_path() -> String {
  "/diary".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_week_start() -> String {
  "monday".to_string()
}

fn default_true() -> bool {
  true
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_diary_path")]
  pub diary_path:   String,
  #[serde(
    default = "default_timeout_secs"
  )]
  pub timeout_secs: u64
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url:     default_base_url(),
      diary_path:   default_diary_path(),
      timeout_secs: default_timeout_secs()
    }
  }
}

impl ApiConfig {
  /// Full URL of the month diary
  /// endpoint.
  #[must_use]
  pub fn diary_endpoint(&self) -> String {
    let base =
      self.base_url.trim_end_matches('/');
    let path = self.diary_path.trim();
    if path.starts_with('/') {
      format!("{base}{path}")
    } else {
      format!("{base}/{path}")
    }
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct CalendarPolicies {
  #[serde(default = "default_week_start")]
  pub week_start:         String,
  #[serde(default)]
  pub day_cap:            usize,
  #[serde(default)]
  pub center_min_span:    u32,
  #[serde(default)]
  pub lane_base_offset:   Option<u32>,
  #[serde(default)]
  pub lane_step:          u32,
  #[serde(default)]
  pub show_adjacent_days: bool
}

impl Default for CalendarPolicies {
  fn default() -> Self {
    Self {
      week_start:         default_week_start(),
      day_cap:            DEFAULT_DAY_CAP,
      center_min_span:
        DEFAULT_CENTER_MIN_SPAN,
      lane_base_offset:   Some(
        DEFAULT_LANE_BASE_OFFSET
      ),
      lane_step:          DEFAULT_LANE_STEP,
      show_adjacent_days: false
    }
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct DisplayConfig {
  #[serde(default = "default_true")]
  pub color: bool
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self { color: true }
  }
}

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct SessionConfig {
  #[serde(default)]
  pub path: Option<PathBuf>
}

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct AppConfig {
  #[serde(default)]
  pub timezone:    Option<String>,
  #[serde(default)]
  pub api:         ApiConfig,
  #[serde(default)]
  pub calendar:    CalendarPolicies,
  #[serde(default)]
  pub display:     DisplayConfig,
  #[serde(default)]
  pub session:     SessionConfig,
  #[serde(skip)]
  pub loaded_from: Option<PathBuf>
}

impl AppConfig {
  #[tracing::instrument(skip(
    override_path
  ))]
  pub fn load(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(override_path)
    else {
      warn!(
        "no config directory found; \
         using defaults"
      );
      return Ok(Self::default());
    };

    if !path.exists() {
      if override_path.is_some() {
        return Err(anyhow!(
          "config file {} does not exist",
          path.display()
        ));
      }
      warn!(
        file = %path.display(),
        "config file not found; using \
         defaults"
      );
      return Ok(Self::default());
    }

    Self::load_file(&path)
  }

  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text =
      fs::read_to_string(path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg = Self::parse(&text)
      .with_context(|| {
        format!(
          "failed to parse {}",
          path.display()
        )
      })?;
    cfg.loaded_from =
      Some(path.to_path_buf());
    info!(
      file = %path.display(),
      week_start = %cfg.calendar.week_start,
      day_cap = cfg.calendar.day_cap,
      "loaded config"
    );
    Ok(cfg)
  }

  pub fn parse(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut cfg =
      toml::from_str::<Self>(text)
        .context("invalid config TOML")?;
    cfg.sanitize();
    Ok(cfg)
  }

  /// Applies `key=value` overrides with
  /// dotted keys, e.g.
  /// `calendar.day_cap=2`.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      self.set(key.trim(), value.trim())?;
    }
    self.sanitize();
    Ok(())
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    match key {
      | "timezone" => {
        self.timezone = (!value.is_empty())
          .then(|| value.to_string());
      }
      | "api.base_url" => {
        self.api.base_url =
          value.to_string();
      }
      | "api.diary_path" => {
        self.api.diary_path =
          value.to_string();
      }
      | "api.timeout_secs" => {
        self.api.timeout_secs =
          parse_number(key, value)?;
      }
      | "calendar.week_start" => {
        self.calendar.week_start =
          value.to_string();
      }
      | "calendar.day_cap" => {
        self.calendar.day_cap =
          parse_number(key, value)?;
      }
      | "calendar.center_min_span" => {
        self.calendar.center_min_span =
          parse_number(key, value)?;
      }
      | "calendar.lane_base_offset" => {
        self.calendar.lane_base_offset =
          Some(parse_number(key, value)?);
      }
      | "calendar.lane_step" => {
        self.calendar.lane_step =
          parse_number(key, value)?;
      }
      | "calendar.show_adjacent_days" => {
        self
          .calendar
          .show_adjacent_days =
          parse_bool(key, value)?;
      }
      | "display.color" => {
        self.display.color =
          parse_bool(key, value)?;
      }
      | "session.path" => {
        self.session.path =
          (!value.is_empty())
            .then(|| PathBuf::from(value));
      }
      | other => {
        return Err(anyhow!(
          "unknown config key: {other}"
        ));
      }
    }
    Ok(())
  }

  fn sanitize(&mut self) {
    let policies = &mut self.calendar;
    if policies
      .week_start
      .trim()
      .is_empty()
    {
      policies.week_start =
        default_week_start();
    }
    if policies.day_cap == 0 {
      policies.day_cap = DEFAULT_DAY_CAP;
    }
    if policies.center_min_span == 0 {
      policies.center_min_span =
        DEFAULT_CENTER_MIN_SPAN;
    }
    if policies.lane_base_offset.is_none()
    {
      policies.lane_base_offset =
        Some(DEFAULT_LANE_BASE_OFFSET);
    }
    if policies.lane_step == 0 {
      policies.lane_step =
        DEFAULT_LANE_STEP;
    }
    if self.api.timeout_secs == 0 {
      self.api.timeout_secs =
        default_timeout_secs();
    }
    if self.api.base_url.trim().is_empty()
    {
      self.api.base_url =
        default_base_url();
    }
  }

  #[must_use]
  pub fn week_start(&self) -> Weekday {
    week_start_from_name(
      &self.calendar.week_start
    )
  }

  #[must_use]
  pub fn layout_policy(
    &self
  ) -> LayoutPolicy {
    LayoutPolicy {
      day_cap:          self
        .calendar
        .day_cap,
      center_min_span:  self
        .calendar
        .center_min_span,
      lane_base_offset: self
        .calendar
        .lane_base_offset
        .unwrap_or(
          DEFAULT_LANE_BASE_OFFSET
        ),
      lane_step:        self
        .calendar
        .lane_step
    }
  }

  pub fn session_path(
    &self
  ) -> anyhow::Result<PathBuf> {
    if let Some(path) = &self.session.path
    {
      return Ok(path.clone());
    }
    let data_dir = dirs::data_dir()
      .ok_or_else(|| {
        anyhow!(
          "cannot determine data \
           directory"
        )
      })?;
    Ok(
      data_dir
        .join(APP_DIR)
        .join("session.json")
    )
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  dirs::config_dir().map(|dir| {
    dir.join(APP_DIR).join("config.toml")
  })
}

fn parse_number<T>(
  key: &str,
  value: &str
) -> anyhow::Result<T>
where
  T: std::str::FromStr,
  T::Err: std::error::Error
    + Send
    + Sync
    + 'static
{
  value.parse::<T>().with_context(|| {
    format!(
      "invalid number for {key}: \
       {value:?}"
    )
  })
}

fn parse_bool(
  key: &str,
  value: &str
) -> anyhow::Result<bool> {
  match value
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Ok(true),
    | "0" | "n" | "no" | "off"
    | "false" => Ok(false),
    | other => {
      Err(anyhow!(
        "invalid boolean for {key}: \
         {other:?}"
      ))
    }
  }
}
