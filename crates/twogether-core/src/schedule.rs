use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::datetime::{compute_date_key, parse_date_key};

const EVENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a8e_93b4_4d57_a0e2_5c7d_19f3_b842);

/// Backend primary key of a diary entry. The backend has sent both numeric
/// and string keys over time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum DiaryKey {
    Number(i64),
    Text(String),
}

impl fmt::Display for DiaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiaryKey::Number(value) => write!(f, "{value}"),
            DiaryKey::Text(value) => write!(f, "{value}"),
        }
    }
}

/// One record of the month diary overview as the backend sends it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiarySchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diary_id: Option<DiaryKey>,

    pub title: String,

    pub start_date: String,

    pub end_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_sticker_url: Option<String>,
}

impl DiarySchedule {
    pub fn new(title: &str, start_date: &str, end_date: &str) -> Self {
        Self {
            diary_id: None,
            title: title.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            main_sticker_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalEvent {
    pub id: EventId,
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker_url: Option<String>,
}

impl CalEvent {
    /// Validates a backend record. Both dates must be strict `YYYY-MM-DD`
    /// keys and the range must not run backwards.
    pub fn from_schedule(id: EventId, schedule: &DiarySchedule) -> anyhow::Result<Self> {
        let start = parse_date_key(&schedule.start_date).context("invalid startDate")?;
        let end = parse_date_key(&schedule.end_date).context("invalid endDate")?;
        if end < start {
            return Err(anyhow!(
                "endDate {} precedes startDate {}",
                compute_date_key(end),
                compute_date_key(start)
            ));
        }

        Ok(Self {
            id,
            title: schedule.title.clone(),
            start,
            end,
            sticker_url: schedule.main_sticker_url.clone(),
        })
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Identity of a schedule that survives the backend reordering its list:
/// the backend key when present, otherwise a hash of the content.
fn base_event_id(schedule: &DiarySchedule) -> String {
    match &schedule.diary_id {
        Some(key) => format!("diary-{key}"),
        None => {
            let content = format!(
                "{}|{}|{}",
                schedule.start_date.trim(),
                schedule.end_date.trim(),
                schedule.title
            );
            let hash = Uuid::new_v5(&EVENT_ID_NAMESPACE, content.as_bytes());
            format!("schedule-{}", hash.simple())
        }
    }
}

/// Turns fetched records into calendar events, in fetch order. Records with
/// malformed or backwards dates are logged and skipped.
#[tracing::instrument(skip_all, fields(count = schedules.len()))]
pub fn ingest(schedules: &[DiarySchedule]) -> Vec<CalEvent> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut events = Vec::with_capacity(schedules.len());

    for (index, schedule) in schedules.iter().enumerate() {
        let base = base_event_id(schedule);
        let occurrence = seen.entry(base.clone()).or_insert(0);
        *occurrence += 1;
        let id = if *occurrence == 1 {
            EventId::new(base)
        } else {
            EventId::new(format!("{base}-{occurrence}"))
        };

        match CalEvent::from_schedule(id, schedule) {
            Ok(event) => events.push(event),
            Err(err) => {
                warn!(
                    index,
                    title = %schedule.title,
                    start_date = %schedule.start_date,
                    end_date = %schedule.end_date,
                    error = %format!("{err:#}"),
                    "skipping malformed schedule"
                );
            }
        }
    }

    debug!(accepted = events.len(), "ingested schedules");
    events
}

pub fn parse_schedules(raw: &str) -> anyhow::Result<Vec<DiarySchedule>> {
    serde_json::from_str(raw).context("failed to parse schedule list JSON")
}

#[tracing::instrument]
pub fn load_schedules_file(path: &Path) -> anyhow::Result<Vec<DiarySchedule>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let schedules = parse_schedules(&raw)
        .with_context(|| format!("failed to load schedules from {}", path.display()))?;
    debug!(file = %path.display(), count = schedules.len(), "loaded schedules file");
    Ok(schedules)
}
