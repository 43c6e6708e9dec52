//! Month event layout.
//!
//! Given a displayed month and a list of
//! date-ranged events this decides which
//! events each day cell shows (capped)
//! and which bar segments get drawn in
//! every grid row.

use std::collections::{
  BTreeMap,
  BTreeSet
};

use chrono::{
  NaiveDate,
  Weekday
};
use serde::Serialize;

use crate::datetime::{
  YearMonth,
  add_days,
  compute_date_key,
  start_of_week,
  weekday_column
};
use crate::schedule::{
  CalEvent,
  EventId
};

pub const DEFAULT_DAY_CAP: usize = 3;
pub const DEFAULT_CENTER_MIN_SPAN: u32 =
  3;
pub const DEFAULT_LANE_BASE_OFFSET: u32 =
  28;
pub const DEFAULT_LANE_STEP: u32 = 26;

/// Day key -> ids of the events shown
/// in that day cell.
pub type DayVisibility =
  BTreeMap<String, BTreeSet<EventId>>;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
  Past,
  Ongoing,
  Upcoming
}

/// Color family of an event bar.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum EventTone {
  Brand,
  Muted,
  LightBrand
}

impl EventState {
  #[must_use]
  pub fn tone(self) -> EventTone {
    match self {
      | EventState::Ongoing => {
        EventTone::Brand
      }
      | EventState::Past => {
        EventTone::Muted
      }
      | EventState::Upcoming => {
        EventTone::LightBrand
      }
    }
  }
}

/// Day-granularity comparison against
/// `today`; both ends are inclusive.
#[must_use]
pub fn classify_event_state(
  event: &CalEvent,
  today: NaiveDate
) -> EventState {
  if event.start <= today
    && today <= event.end
  {
    EventState::Ongoing
  } else if today > event.end {
    EventState::Past
  } else {
    EventState::Upcoming
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct LayoutPolicy {
  pub day_cap:          usize,
  pub center_min_span:  u32,
  pub lane_base_offset: u32,
  pub lane_step:        u32
}

impl Default for LayoutPolicy {
  fn default() -> Self {
    Self {
      day_cap:          DEFAULT_DAY_CAP,
      center_min_span:
        DEFAULT_CENTER_MIN_SPAN,
      lane_base_offset:
        DEFAULT_LANE_BASE_OFFSET,
      lane_step:        DEFAULT_LANE_STEP
    }
  }
}

impl LayoutPolicy {
  #[must_use]
  pub fn lane_offset(
    &self,
    lane: usize
  ) -> u32 {
    let lane =
      u32::try_from(lane).unwrap_or(u32::MAX);
    self.lane_base_offset.saturating_add(
      lane.saturating_mul(self.lane_step)
    )
  }
}

/// Geometry of a 7-column month grid.
///
/// Rows cover whole weeks. When
/// `show_adjacent_days` is off only the
/// displayed month's days take part in
/// the layout; otherwise the leading and
/// trailing days of neighbouring months
/// that share a row do too.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct MonthGrid {
  month:              YearMonth,
  week_start:         Weekday,
  grid_start:         NaiveDate,
  first_day_offset:   u32,
  rows:               u32,
  window_start:       NaiveDate,
  window_end:         NaiveDate,
  show_adjacent_days: bool
}

impl MonthGrid {
  #[must_use]
  pub fn new(
    month: YearMonth,
    week_start: Weekday,
    show_adjacent_days: bool
  ) -> Self {
    let first = month.first_day();
    let first_day_offset =
      weekday_column(first, week_start);
    let grid_start =
      start_of_week(first, week_start);
    let rows = (first_day_offset
      + month.days())
    .div_ceil(7);

    let (window_start, window_end) =
      if show_adjacent_days {
        (
          grid_start,
          add_days(
            grid_start,
            i64::from(rows * 7) - 1
          )
        )
      } else {
        (first, month.last_day())
      };

    Self {
      month,
      week_start,
      grid_start,
      first_day_offset,
      rows,
      window_start,
      window_end,
      show_adjacent_days
    }
  }

  #[must_use]
  pub fn month(&self) -> YearMonth {
    self.month
  }

  #[must_use]
  pub fn week_start(&self) -> Weekday {
    self.week_start
  }

  /// Column (0-based) of the 1st of
  /// the month.
  #[must_use]
  pub fn first_day_offset(&self) -> u32 {
    self.first_day_offset
  }

  #[must_use]
  pub fn rows(&self) -> u32 {
    self.rows
  }

  #[must_use]
  pub fn window(
    &self
  ) -> (NaiveDate, NaiveDate) {
    (self.window_start, self.window_end)
  }

  #[must_use]
  pub fn shows_adjacent_days(
    &self
  ) -> bool {
    self.show_adjacent_days
  }

  #[must_use]
  pub fn in_window(
    &self,
    day: NaiveDate
  ) -> bool {
    self.window_start <= day
      && day <= self.window_end
  }

  /// Date drawn at 1-based `(week, col)`.
  #[must_use]
  pub fn cell_date(
    &self,
    week: u32,
    col: u32
  ) -> NaiveDate {
    let linear = (week.saturating_sub(1)
      * 7)
      + col.saturating_sub(1);
    add_days(
      self.grid_start,
      i64::from(linear)
    )
  }

  /// 1-based `(week, col)` of a day in
  /// the window.
  #[must_use]
  pub fn cell_position(
    &self,
    day: NaiveDate
  ) -> Option<(u32, u32)> {
    if !self.in_window(day) {
      return None;
    }
    let linear = self.linear_index(day);
    Some((linear / 7 + 1, linear % 7 + 1))
  }

  // Equals `first_day_offset + dom - 1`
  // for days of the displayed month.
  fn linear_index(
    &self,
    day: NaiveDate
  ) -> u32 {
    let days =
      (day - self.grid_start).num_days();
    u32::try_from(days).unwrap_or(0)
  }

  fn clip(
    &self,
    event: &CalEvent
  ) -> Option<(NaiveDate, NaiveDate)> {
    let first =
      event.start.max(self.window_start);
    let last =
      event.end.min(self.window_end);
    (first <= last).then_some((first, last))
  }
}

/// Picks at most `cap` events per day.
/// Events that started most recently win
/// a crowded day; membership is decided
/// independently for every day.
pub fn select_top_events_per_day(
  events: &[CalEvent],
  month_start: NaiveDate,
  month_end: NaiveDate,
  cap: usize
) -> DayVisibility {
  let mut ordered: Vec<&CalEvent> =
    events.iter().collect();
  ordered.sort_by(|a, b| {
    b.start.cmp(&a.start)
  });

  let mut visibility =
    DayVisibility::new();
  for event in ordered {
    let first =
      event.start.max(month_start);
    let last = event.end.min(month_end);
    if first > last {
      continue;
    }

    for day in first
      .iter_days()
      .take_while(|day| *day <= last)
    {
      let slot = visibility
        .entry(compute_date_key(day))
        .or_default();
      if slot.len() < cap {
        slot.insert(event.id.clone());
      }
    }
  }

  visibility
}

/// One bar inside one grid row.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct Segment {
  pub event_id:      EventId,
  pub event_index:   usize,
  pub start:         NaiveDate,
  pub week:          u32,
  pub col:           u32,
  pub span:          u32,
  pub end_col:       u32,
  pub should_center: bool,
  pub lane:          usize,
  pub offset_px:     u32
}

/// Splits every event into per-row
/// segments. A segment is emitted only
/// when its first day shows the event.
/// Lanes follow list order.
pub fn build_segments(
  events: &[CalEvent],
  grid: &MonthGrid,
  visibility: &DayVisibility,
  policy: &LayoutPolicy
) -> Vec<Segment> {
  let mut segments = Vec::new();

  for (index, event) in
    events.iter().enumerate()
  {
    let Some((first, last)) =
      grid.clip(event)
    else {
      continue;
    };

    let mut cursor = first;
    while cursor <= last {
      let linear =
        grid.linear_index(cursor);
      let week = linear / 7 + 1;
      let col = linear % 7 + 1;
      let max_span_in_row = 7 - col + 1;
      let remaining_days = u32::try_from(
        (last - cursor).num_days() + 1
      )
      .unwrap_or(u32::MAX);
      let span =
        max_span_in_row.min(remaining_days);

      let visible = visibility
        .get(&compute_date_key(cursor))
        .is_some_and(|ids| {
          ids.contains(&event.id)
        });
      if visible {
        segments.push(Segment {
          event_id: event.id.clone(),
          event_index: index,
          start: cursor,
          week,
          col,
          span,
          end_col: col + span - 1,
          should_center: span
            >= policy.center_min_span,
          lane: index,
          offset_px: policy
            .lane_offset(index)
        });
      }

      let Some(next) = cursor
        .checked_add_signed(
          chrono::Duration::days(
            i64::from(span)
          )
        )
      else {
        break;
      };
      cursor = next;
    }
  }

  segments
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct EventStatus {
  pub event_id:    EventId,
  pub event_index: usize,
  pub state:       EventState,
  pub tone:        EventTone
}

/// Everything the renderer needs for one
/// month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthLayout {
  pub grid:          MonthGrid,
  pub today:         NaiveDate,
  pub visibility:    DayVisibility,
  pub segments:      Vec<Segment>,
  pub states:        Vec<EventStatus>,
  pub hidden_counts: BTreeMap<String, usize>
}

impl MonthLayout {
  #[tracing::instrument(
    skip_all,
    fields(
      month = %grid.month(),
      events = events.len()
    )
  )]
  pub fn compute(
    events: &[CalEvent],
    grid: &MonthGrid,
    today: NaiveDate,
    policy: &LayoutPolicy
  ) -> Self {
    let (window_start, window_end) =
      grid.window();
    let visibility =
      select_top_events_per_day(
        events,
        window_start,
        window_end,
        policy.day_cap
      );
    let segments = build_segments(
      events,
      grid,
      &visibility,
      policy
    );
    let states = events
      .iter()
      .enumerate()
      .map(|(index, event)| {
        let state =
          classify_event_state(
            event, today
          );
        EventStatus {
          event_id: event.id.clone(),
          event_index: index,
          state,
          tone: state.tone()
        }
      })
      .collect();
    let hidden_counts = hidden_counts(
      events,
      grid,
      &segments
    );

    tracing::debug!(
      visible_days = visibility.len(),
      segments = segments.len(),
      crowded_days = hidden_counts.len(),
      "month layout computed"
    );

    Self {
      grid: grid.clone(),
      today,
      visibility,
      segments,
      states,
      hidden_counts
    }
  }

  #[must_use]
  pub fn visible_on(
    &self,
    day: NaiveDate
  ) -> Option<&BTreeSet<EventId>> {
    self
      .visibility
      .get(&compute_date_key(day))
  }

  #[must_use]
  pub fn hidden_on(
    &self,
    day: NaiveDate
  ) -> usize {
    self
      .hidden_counts
      .get(&compute_date_key(day))
      .copied()
      .unwrap_or(0)
  }

  #[must_use]
  pub fn state_of(
    &self,
    id: &EventId
  ) -> Option<&EventStatus> {
    self
      .states
      .iter()
      .find(|status| &status.event_id == id)
  }

  pub fn segments_in_week(
    &self,
    week: u32
  ) -> impl Iterator<Item = &Segment> {
    self
      .segments
      .iter()
      .filter(move |segment| {
        segment.week == week
      })
  }
}

// Events that touch a day but have no
// bar drawn over it, for "+N" badges.
fn hidden_counts(
  events: &[CalEvent],
  grid: &MonthGrid,
  segments: &[Segment]
) -> BTreeMap<String, usize> {
  let drawn = drawn_days(segments);
  let (window_start, window_end) =
    grid.window();
  let mut counts = BTreeMap::new();

  for day in window_start
    .iter_days()
    .take_while(|day| *day <= window_end)
  {
    let key = compute_date_key(day);
    let on_day = drawn.get(&key);
    let hidden = events
      .iter()
      .filter(|event| event.covers(day))
      .filter(|event| {
        !on_day.is_some_and(|ids| {
          ids.contains(&event.id)
        })
      })
      .count();
    if hidden > 0 {
      counts.insert(key, hidden);
    }
  }

  counts
}

// Day key -> ids whose bar passes over
// that day.
fn drawn_days(
  segments: &[Segment]
) -> BTreeMap<String, BTreeSet<&EventId>> {
  let mut drawn: BTreeMap<
    String,
    BTreeSet<&EventId>
  > = BTreeMap::new();
  for segment in segments {
    for day in segment
      .start
      .iter_days()
      .take(segment.span as usize)
    {
      drawn
        .entry(compute_date_key(day))
        .or_default()
        .insert(&segment.event_id);
    }
  }
  drawn
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    Weekday
  };

  use super::*;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn event(
    id: &str,
    start: NaiveDate,
    end: NaiveDate
  ) -> CalEvent {
    CalEvent {
      id: EventId::new(id),
      title: id.to_string(),
      start,
      end,
      sticker_url: None
    }
  }

  fn month(
    y: i32,
    m: u32
  ) -> YearMonth {
    YearMonth::new(y, m)
      .expect("valid month")
  }

  fn june_grid() -> MonthGrid {
    MonthGrid::new(
      month(2024, 6),
      Weekday::Mon,
      false
    )
  }

  fn layout_of(
    events: &[CalEvent],
    grid: &MonthGrid
  ) -> MonthLayout {
    MonthLayout::compute(
      events,
      grid,
      date(2024, 6, 15),
      &LayoutPolicy::default()
    )
  }

  #[test]
  fn grid_geometry_for_june_2024() {
    let grid = june_grid();
    assert_eq!(grid.first_day_offset(), 5);
    assert_eq!(grid.rows(), 5);
    assert_eq!(
      grid.window(),
      (date(2024, 6, 1), date(2024, 6, 30))
    );
    assert_eq!(
      grid.cell_position(date(2024, 6, 1)),
      Some((1, 6))
    );
    assert_eq!(
      grid.cell_position(date(2024, 6, 30)),
      Some((5, 7))
    );
    assert_eq!(
      grid.cell_date(1, 1),
      date(2024, 5, 27)
    );
    assert_eq!(
      grid.cell_position(date(2024, 7, 1)),
      None
    );

    let sunday = MonthGrid::new(
      month(2024, 6),
      Weekday::Sun,
      false
    );
    assert_eq!(
      sunday.first_day_offset(),
      6
    );
    assert_eq!(sunday.rows(), 6);
  }

  #[test]
  fn adjacent_window_covers_whole_rows() {
    let grid = MonthGrid::new(
      month(2024, 6),
      Weekday::Mon,
      true
    );
    assert_eq!(
      grid.window(),
      (date(2024, 5, 27), date(2024, 6, 30))
    );
  }

  #[test]
  fn classifies_state_at_boundaries() {
    let today = date(2024, 6, 15);
    let same_day =
      event("a", today, today);
    let ended_yesterday = event(
      "b",
      date(2024, 6, 10),
      date(2024, 6, 14)
    );
    let starts_tomorrow = event(
      "c",
      date(2024, 6, 16),
      date(2024, 6, 20)
    );
    let spanning = event(
      "d",
      date(2024, 6, 1),
      date(2024, 6, 30)
    );

    assert_eq!(
      classify_event_state(&same_day, today),
      EventState::Ongoing
    );
    assert_eq!(
      classify_event_state(
        &ended_yesterday,
        today
      ),
      EventState::Past
    );
    assert_eq!(
      classify_event_state(
        &starts_tomorrow,
        today
      ),
      EventState::Upcoming
    );
    assert_eq!(
      classify_event_state(&spanning, today),
      EventState::Ongoing
    );
    assert_eq!(
      EventState::Past.tone(),
      EventTone::Muted
    );
    assert_eq!(
      EventState::Upcoming.tone(),
      EventTone::LightBrand
    );
  }

  #[test]
  fn later_start_wins_single_slot() {
    let a = event(
      "a",
      date(2024, 6, 1),
      date(2024, 6, 20)
    );
    let b = event(
      "b",
      date(2024, 6, 10),
      date(2024, 6, 20)
    );
    let visibility =
      select_top_events_per_day(
        &[a, b],
        date(2024, 6, 1),
        date(2024, 6, 30),
        1
      );

    let on = |d: u32| {
      visibility
        .get(&compute_date_key(date(
          2024, 6, d
        )))
        .cloned()
        .unwrap_or_default()
    };
    assert_eq!(
      on(15),
      BTreeSet::from([EventId::new("b")])
    );
    assert_eq!(
      on(5),
      BTreeSet::from([EventId::new("a")])
    );
  }

  #[test]
  fn day_cap_is_never_exceeded() {
    // Deterministic pseudo-random ranges.
    let mut seed: u64 = 0x2545_f491;
    let mut next = move || {
      seed = seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1);
      (seed >> 33) as u32
    };

    let events = (0..40)
      .map(|i| {
        let start = 1 + next() % 30;
        let len = next() % 12;
        let end = (start + len).min(30);
        event(
          &format!("e{i}"),
          date(2024, 6, start),
          date(2024, 6, end)
        )
      })
      .collect::<Vec<_>>();

    let layout =
      layout_of(&events, &june_grid());
    for ids in layout.visibility.values() {
      assert!(ids.len() <= DEFAULT_DAY_CAP);
    }
    for segment in &layout.segments {
      let ids = layout
        .visible_on(segment.start)
        .expect("segment day is tracked");
      assert!(
        ids.contains(&segment.event_id)
      );
      assert!(segment.end_col <= 7);
    }
  }

  #[test]
  fn membership_is_decided_per_day() {
    let long = event(
      "long",
      date(2024, 6, 1),
      date(2024, 6, 30)
    );
    let mut events = vec![long];
    for i in 0..3 {
      events.push(event(
        &format!("short{i}"),
        date(2024, 6, 15),
        date(2024, 6, 15)
      ));
    }

    let layout =
      layout_of(&events, &june_grid());
    let long_id = EventId::new("long");
    assert!(
      !layout
        .visible_on(date(2024, 6, 15))
        .expect("crowded day")
        .contains(&long_id)
    );
    assert!(
      layout
        .visible_on(date(2024, 6, 14))
        .expect("quiet day")
        .contains(&long_id)
    );
    // The row bar that starts on Jun 10
    // still runs through Jun 15.
    assert_eq!(
      layout.hidden_on(date(2024, 6, 15)),
      0
    );
    assert_eq!(
      layout.hidden_on(date(2024, 6, 14)),
      0
    );
  }

  #[test]
  fn month_boundary_event_never_crosses_a_row()
  {
    // July 2023 starts on a Saturday, so
    // Jun 28 - Jul 3 touches two rows.
    let trip = event(
      "trip",
      date(2023, 6, 28),
      date(2023, 7, 3)
    );

    for adjacent in [false, true] {
      let grid = MonthGrid::new(
        month(2023, 7),
        Weekday::Mon,
        adjacent
      );
      let layout = MonthLayout::compute(
        std::slice::from_ref(&trip),
        &grid,
        date(2023, 7, 1),
        &LayoutPolicy::default()
      );
      assert!(layout.segments.len() >= 2);
      for segment in &layout.segments {
        assert!(
          segment.col + segment.span - 1
            <= 7
        );
        assert_eq!(
          segment.end_col,
          segment.col + segment.span - 1
        );
      }
    }

    let month_only = MonthGrid::new(
      month(2023, 7),
      Weekday::Mon,
      false
    );
    let layout = MonthLayout::compute(
      &[trip],
      &month_only,
      date(2023, 7, 1),
      &LayoutPolicy::default()
    );
    let placed = layout
      .segments
      .iter()
      .map(|s| (s.week, s.col, s.span))
      .collect::<Vec<_>>();
    assert_eq!(
      placed,
      vec![(1, 6, 2), (2, 1, 1)]
    );
  }

  #[test]
  fn previous_month_start_is_clipped() {
    let carry_over = event(
      "carry",
      date(2024, 5, 28),
      date(2024, 6, 3)
    );
    let layout =
      layout_of(&[carry_over], &june_grid());
    let placed = layout
      .segments
      .iter()
      .map(|s| {
        (s.start, s.week, s.col, s.span)
      })
      .collect::<Vec<_>>();
    assert_eq!(
      placed,
      vec![
        (date(2024, 6, 1), 1, 6, 2),
        (date(2024, 6, 3), 2, 1, 1),
      ]
    );
    assert!(
      layout
        .visible_on(date(2024, 5, 31))
        .is_none()
    );
  }

  #[test]
  fn capped_start_day_suppresses_only_that_segment()
  {
    // Jun 3 2024 is a Monday.
    let mut events = (0..3)
      .map(|i| {
        event(
          &format!("busy{i}"),
          date(2024, 6, 3),
          date(2024, 6, 3)
        )
      })
      .collect::<Vec<_>>();
    events.push(event(
      "week",
      date(2024, 6, 3),
      date(2024, 6, 12)
    ));

    let layout =
      layout_of(&events, &june_grid());
    let week_id = EventId::new("week");
    let mine = layout
      .segments
      .iter()
      .filter(|s| s.event_id == week_id)
      .collect::<Vec<_>>();

    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].start, date(2024, 6, 10));
    assert_eq!(
      (mine[0].week, mine[0].col, mine[0].span),
      (3, 1, 3)
    );
    assert!(mine[0].should_center);
    assert!(
      !layout
        .visible_on(date(2024, 6, 3))
        .expect("crowded day")
        .contains(&week_id)
    );
    assert!(
      layout
        .visible_on(date(2024, 6, 4))
        .expect("quiet day")
        .contains(&week_id)
    );

    // No bar runs Jun 3 - 9, so every
    // day of that row badges the event.
    for d in 3..=9 {
      assert_eq!(
        layout.hidden_on(date(2024, 6, d)),
        1,
        "Jun {d}"
      );
    }
    for d in 10..=12 {
      assert_eq!(
        layout.hidden_on(date(2024, 6, d)),
        0,
        "Jun {d}"
      );
    }
  }

  #[test]
  fn every_touched_day_is_drawn_or_counted()
  {
    let mut seed: u64 = 0x9e37_79b9;
    let mut next = move || {
      seed = seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1);
      (seed >> 33) as u32
    };

    let events = (0..30)
      .map(|i| {
        let start = 1 + next() % 30;
        let end =
          (start + next() % 14).min(30);
        event(
          &format!("e{i}"),
          date(2024, 6, start),
          date(2024, 6, end)
        )
      })
      .collect::<Vec<_>>();

    let layout =
      layout_of(&events, &june_grid());
    for day in date(2024, 6, 1)
      .iter_days()
      .take(30)
    {
      let touching = events
        .iter()
        .filter(|event| event.covers(day))
        .collect::<Vec<_>>();
      let drawn = touching
        .iter()
        .filter(|event| {
          layout.segments.iter().any(|s| {
            s.event_id == event.id
              && s.start <= day
              && day
                < add_days(
                  s.start,
                  i64::from(s.span)
                )
          })
        })
        .count();
      assert_eq!(
        drawn + layout.hidden_on(day),
        touching.len(),
        "{day}"
      );
    }
  }

  #[test]
  fn lanes_follow_list_order() {
    let events = vec![
      event(
        "first",
        date(2024, 6, 20),
        date(2024, 6, 20)
      ),
      event(
        "second",
        date(2024, 6, 3),
        date(2024, 6, 4)
      ),
      event(
        "third",
        date(2024, 6, 3),
        date(2024, 6, 3)
      ),
    ];
    let layout =
      layout_of(&events, &june_grid());
    let offsets = layout
      .segments
      .iter()
      .map(|s| {
        (s.event_id.to_string(), s.lane, s.offset_px, s.should_center)
      })
      .collect::<Vec<_>>();
    assert_eq!(
      offsets,
      vec![
        ("first".to_string(), 0, 28, false),
        ("second".to_string(), 1, 54, false),
        ("third".to_string(), 2, 80, false),
      ]
    );
  }

  #[test]
  fn empty_input_yields_empty_layout() {
    let layout =
      layout_of(&[], &june_grid());
    assert!(layout.visibility.is_empty());
    assert!(layout.segments.is_empty());
    assert!(layout.states.is_empty());
    assert!(layout.hidden_counts.is_empty());
  }

  #[test]
  fn events_outside_window_contribute_nothing()
  {
    let events = vec![event(
      "may",
      date(2024, 5, 1),
      date(2024, 5, 31)
    )];
    let layout =
      layout_of(&events, &june_grid());
    assert!(layout.visibility.is_empty());
    assert!(layout.segments.is_empty());
    assert_eq!(
      layout.states[0].state,
      EventState::Past
    );
  }
}
