use std::fmt;
use std::str::FromStr;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use regex::Regex;
use serde::{
  Serialize,
  Serializer
};

const TIMEZONE_ENV_VAR: &str =
  "TWOGETHER_TIMEZONE";
pub const DEFAULT_TIMEZONE: &str =
  "Asia/Seoul";

/// Canonical `YYYY-MM-DD` key for a
/// calendar day. Used to join events
/// to grid cells.
#[must_use]
pub fn compute_date_key(
  date: NaiveDate
) -> String {
  format!(
    "{:04}-{:02}-{:02}",
    date.year(),
    date.month(),
    date.day()
  )
}

/// Parses a strict `YYYY-MM-DD` key
/// into a calendar day. No timezone is
/// involved, so the day can never
/// shift.
pub fn parse_date_key(
  raw: &str
) -> anyhow::Result<NaiveDate> {
  let trimmed = raw.trim();
  let date_re = Regex::new(
    r"^(\d{4})-(\d{2})-(\d{2})$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile \
       failure: {e}"
    )
  })?;
  let captures = date_re
    .captures(trimmed)
    .ok_or_else(|| {
      anyhow!(
        "expected YYYY-MM-DD, got \
         {raw:?}"
      )
    })?;

  let year = captures[1]
    .parse::<i32>()
    .with_context(|| {
      format!("invalid year in {raw:?}")
    })?;
  let month = captures[2]
    .parse::<u32>()
    .with_context(|| {
      format!(
        "invalid month in {raw:?}"
      )
    })?;
  let day = captures[3]
    .parse::<u32>()
    .with_context(|| {
      format!("invalid day in {raw:?}")
    })?;

  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .ok_or_else(|| {
    anyhow!(
      "{raw:?} is not a calendar date"
    )
  })
}

/// A displayed month.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct YearMonth {
  year:  i32,
  month: u32
}

impl YearMonth {
  pub fn new(
    year: i32,
    month: u32
  ) -> anyhow::Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(anyhow!(
        "month must be 1-12, got \
         {month}"
      ));
    }
    if NaiveDate::from_ymd_opt(
      year, month, 1
    )
    .is_none()
    {
      return Err(anyhow!(
        "year {year} is out of range"
      ));
    }
    Ok(Self { year, month })
  }

  #[must_use]
  pub fn of(date: NaiveDate) -> Self {
    Self {
      year:  date.year(),
      month: date.month()
    }
  }

  #[must_use]
  pub fn year(self) -> i32 {
    self.year
  }

  #[must_use]
  pub fn month(self) -> u32 {
    self.month
  }

  #[must_use]
  pub fn first_day(self) -> NaiveDate {
    first_day_of_month(
      self.year, self.month
    )
  }

  #[must_use]
  pub fn last_day(self) -> NaiveDate {
    last_day_of_month(
      self.year, self.month
    )
  }

  #[must_use]
  pub fn days(self) -> u32 {
    self.last_day().day()
  }

  #[must_use]
  pub fn shift(
    self,
    months: i32
  ) -> Self {
    Self::of(shift_months(
      self.first_day(),
      months
    ))
  }

  #[must_use]
  pub fn title(self) -> String {
    self
      .first_day()
      .format("%B %Y")
      .to_string()
  }
}

impl fmt::Display for YearMonth {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{:04}-{:02}",
      self.year, self.month
    )
  }
}

impl FromStr for YearMonth {
  type Err = anyhow::Error;

  fn from_str(
    raw: &str
  ) -> Result<Self, Self::Err> {
    let trimmed = raw.trim();
    let month_re =
      Regex::new(r"^(\d{4})-(\d{2})$")
        .map_err(|e| {
          anyhow!(
            "internal regex compile \
             failure: {e}"
          )
        })?;
    let captures = month_re
      .captures(trimmed)
      .ok_or_else(|| {
        anyhow!(
          "expected YYYY-MM, got \
           {raw:?}"
        )
      })?;
    let year = captures[1]
      .parse::<i32>()
      .with_context(|| {
        format!(
          "invalid year in {raw:?}"
        )
      })?;
    let month = captures[2]
      .parse::<u32>()
      .with_context(|| {
        format!(
          "invalid month in {raw:?}"
        )
      })?;
    Self::new(year, month)
  }
}

impl Serialize for YearMonth {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer
      .serialize_str(&self.to_string())
  }
}

pub fn first_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .unwrap_or(NaiveDate::MIN)
}

pub fn last_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  add_days(
    first_day_of_month(
      next_year, next_month
    ),
    -1
  )
}

pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  last_day_of_month(year, month).day()
}

pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let mut year = date.year();
  let mut month =
    date.month() as i32 + months;

  while month < 1 {
    month += 12;
    year = year.saturating_sub(1);
  }
  while month > 12 {
    month -= 12;
    year = year.saturating_add(1);
  }

  let month = month as u32;
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .unwrap_or(date)
}

pub fn start_of_week(
  day: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let diff =
    weekday_column(day, week_start);
  add_days(day, -i64::from(diff))
}

/// Zero-based column of `day` in a
/// grid whose first column is
/// `week_start`.
pub fn weekday_column(
  day: NaiveDate,
  week_start: Weekday
) -> u32 {
  let day_idx = day
    .weekday()
    .num_days_from_monday();
  let start_idx =
    week_start.num_days_from_monday();
  (7 + day_idx - start_idx) % 7
}

pub fn week_start_from_name(
  raw: &str
) -> Weekday {
  if raw
    .trim()
    .eq_ignore_ascii_case("sunday")
  {
    Weekday::Sun
  } else {
    Weekday::Mon
  }
}

pub fn weekday_labels(
  week_start: Weekday
) -> Vec<&'static str> {
  let mut day = week_start;
  let mut labels =
    Vec::with_capacity(7);
  for _ in 0..7 {
    labels.push(match day {
      | Weekday::Mon => "Mon",
      | Weekday::Tue => "Tue",
      | Weekday::Wed => "Wed",
      | Weekday::Thu => "Thu",
      | Weekday::Fri => "Fri",
      | Weekday::Sat => "Sat",
      | Weekday::Sun => "Sun"
    });
    day = day.succ();
  }
  labels
}

/// Resolves the timezone used to
/// decide "today": environment first,
/// then the configured id, then the
/// default.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return tz;
  }

  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "config")
  {
    return tz;
  }

  parse_timezone(
    DEFAULT_TIMEZONE,
    "DEFAULT_TIMEZONE"
  )
  .unwrap_or_else(|| {
    tracing::error!(
      "failed to parse fallback \
       timezone; using UTC"
    );
    chrono_tz::UTC
  })
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "resolved timezone"
      );
      Some(tz)
    }
    | Err(error) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %error,
        "invalid timezone id"
      );
      None
    }
  }
}

#[must_use]
pub fn today_in_timezone(
  timezone: Tz
) -> NaiveDate {
  Utc::now()
    .with_timezone(&timezone)
    .date_naive()
}
