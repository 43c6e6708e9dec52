use chrono::NaiveDate;
use serde::Serialize;

use crate::datetime::YearMonth;
use crate::schedule::{
  CalEvent,
  DiarySchedule,
  ingest
};

/// A month request tagged with the
/// generation it was issued in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct MonthTicket {
  generation: u64,
  month:      YearMonth
}

impl MonthTicket {
  #[must_use]
  pub fn generation(self) -> u64 {
    self.generation
  }

  #[must_use]
  pub fn month(self) -> YearMonth {
    self.month
  }
}

/// Only the most recently issued ticket
/// may deliver data. Older responses are
/// stale no matter which month they
/// carry.
#[derive(Debug, Clone, Default)]
pub struct MonthRequestTracker {
  generation: u64
}

impl MonthRequestTracker {
  pub fn begin(
    &mut self,
    month: YearMonth
  ) -> MonthTicket {
    self.generation =
      self.generation.wrapping_add(1);
    tracing::trace!(
      generation = self.generation,
      month = %month,
      "issued month request"
    );
    MonthTicket {
      generation: self.generation,
      month
    }
  }

  #[must_use]
  pub fn is_current(
    &self,
    ticket: &MonthTicket
  ) -> bool {
    ticket.generation == self.generation
  }
}

#[derive(Debug, Clone)]
pub struct CalendarState {
  focus:     YearMonth,
  schedules: Vec<DiarySchedule>,
  loaded:    Option<YearMonth>,
  tracker:   MonthRequestTracker
}

impl CalendarState {
  #[must_use]
  pub fn new(focus: YearMonth) -> Self {
    Self {
      focus,
      schedules: Vec::new(),
      loaded: None,
      tracker: MonthRequestTracker::default()
    }
  }

  #[must_use]
  pub fn focus(&self) -> YearMonth {
    self.focus
  }

  /// Month whose schedules are held, if
  /// any response has been applied.
  #[must_use]
  pub fn loaded_month(
    &self
  ) -> Option<YearMonth> {
    self.loaded
  }

  #[must_use]
  pub fn schedules(
    &self
  ) -> &[DiarySchedule] {
    &self.schedules
  }

  pub fn request_current(
    &mut self
  ) -> MonthTicket {
    self.tracker.begin(self.focus)
  }

  /// Moves the focus by `step` months
  /// and issues the request for it.
  pub fn navigate(
    &mut self,
    step: i32
  ) -> MonthTicket {
    self.focus = self.focus.shift(step);
    tracing::debug!(
      focus = %self.focus,
      step,
      "calendar navigated"
    );
    self.request_current()
  }

  /// Replaces the held schedules
  /// wholesale when `ticket` is still
  /// current. Returns whether it was
  /// applied.
  pub fn apply(
    &mut self,
    ticket: &MonthTicket,
    schedules: Vec<DiarySchedule>
  ) -> bool {
    if !self.tracker.is_current(ticket) {
      tracing::debug!(
        stale_month = %ticket.month,
        stale_generation =
          ticket.generation,
        focus = %self.focus,
        "discarding stale month response"
      );
      return false;
    }

    tracing::debug!(
      month = %ticket.month,
      count = schedules.len(),
      "applied month schedules"
    );
    self.schedules = schedules;
    self.loaded = Some(ticket.month);
    true
  }

  #[must_use]
  pub fn events(&self) -> Vec<CalEvent> {
    ingest(&self.schedules)
  }
}

/// All events touching `date`, uncapped,
/// in list order.
pub fn day_events(
  events: &[CalEvent],
  date: NaiveDate
) -> Vec<&CalEvent> {
  events
    .iter()
    .filter(|event| event.covers(date))
    .collect()
}

/// What a click on a day cell leads to.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum DayAction {
  OpenDetail {
    date: NaiveDate
  },
  ChooseSchedule {
    date:       NaiveDate,
    candidates: Vec<CalEvent>
  }
}

impl DayAction {
  #[must_use]
  pub fn date(&self) -> NaiveDate {
    match self {
      | DayAction::OpenDetail {
        date
      }
      | DayAction::ChooseSchedule {
        date,
        ..
      } => *date
    }
  }
}

pub fn resolve_day_click(
  events: &[CalEvent],
  date: NaiveDate
) -> DayAction {
  let touching =
    day_events(events, date);
  if touching.len() >= 2 {
    DayAction::ChooseSchedule {
      date,
      candidates: touching
        .into_iter()
        .cloned()
        .collect()
    }
  } else {
    DayAction::OpenDetail { date }
  }
}
