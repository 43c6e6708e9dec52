use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, IsTerminal};

use anyhow::Context;
use chrono::Datelike;
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::calendar::DayAction;
use crate::config::AppConfig;
use crate::datetime::{YearMonth, compute_date_key, weekday_labels};
use crate::layout::{EventTone, MonthLayout, Segment};
use crate::schedule::{CalEvent, EventId};

const CELL_WIDTH: usize = 11;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            color: cfg.display.color && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all, fields(month = %layout.grid.month()))]
    pub fn render_month(&self, layout: &MonthLayout, events: &[CalEvent]) -> String {
        let grid = &layout.grid;
        let titles: HashMap<&EventId, &str> = events
            .iter()
            .map(|event| (&event.id, event.title.as_str()))
            .collect();
        let full_width = CELL_WIDTH * 7;
        let mut out = String::new();

        let heading = center(&grid.month().title(), full_width);
        let _ = writeln!(out, "{}", self.paint(heading.trim_end(), "1"));

        let mut labels = String::new();
        for label in weekday_labels(grid.week_start()) {
            labels.push_str(&pad_right(label, CELL_WIDTH));
        }
        let _ = writeln!(out, "{}", labels.trim_end());
        let _ = writeln!(out, "{}", "-".repeat(full_width));

        for week in 1..=grid.rows() {
            let mut numbers = String::new();
            for col in 1..=7 {
                let day = grid.cell_date(week, col);
                let in_month = YearMonth::of(day) == grid.month();
                let mut label = if in_month || grid.shows_adjacent_days() {
                    format!("{:>2}", day.day())
                } else {
                    String::new()
                };
                if day == layout.today && grid.in_window(day) {
                    label.push('*');
                }
                let cell = pad_right(&label, CELL_WIDTH);
                if in_month {
                    numbers.push_str(&cell);
                } else {
                    numbers.push_str(&self.paint(&cell, "90"));
                }
            }
            let _ = writeln!(out, "{}", numbers.trim_end());

            for row in pack_rows(layout.segments_in_week(week)) {
                let _ = writeln!(out, "{}", self.bar_line(layout, &row, &titles).trim_end());
            }

            let mut badges = String::new();
            let mut any_hidden = false;
            for col in 1..=7 {
                let hidden = layout.hidden_on(grid.cell_date(week, col));
                let badge = if hidden > 0 {
                    any_hidden = true;
                    format!("+{hidden}")
                } else {
                    String::new()
                };
                badges.push_str(&pad_right(&badge, CELL_WIDTH));
            }
            if any_hidden {
                let _ = writeln!(out, "{}", badges.trim_end());
            }
        }

        out
    }

    pub fn render_day_action(&self, action: &DayAction) -> String {
        match action {
            DayAction::OpenDetail { date } => {
                format!("open diary detail: date={}\n", compute_date_key(*date))
            }
            DayAction::ChooseSchedule { date, candidates } => {
                let mut out = format!(
                    "{} schedules on {}; choose one:\n",
                    candidates.len(),
                    compute_date_key(*date)
                );
                for (idx, event) in candidates.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "  {}. {} ({} ~ {})",
                        idx + 1,
                        event.title,
                        compute_date_key(event.start),
                        compute_date_key(event.end)
                    );
                }
                out
            }
        }
    }

    fn bar_line(
        &self,
        layout: &MonthLayout,
        row: &[&Segment],
        titles: &HashMap<&EventId, &str>,
    ) -> String {
        let mut line = String::new();
        let mut next_col = 1;

        for segment in row {
            while next_col < segment.col {
                line.push_str(&" ".repeat(CELL_WIDTH));
                next_col += 1;
            }

            let tone = layout
                .state_of(&segment.event_id)
                .map(|status| status.tone)
                .unwrap_or(EventTone::LightBrand);
            let title = titles
                .get(&segment.event_id)
                .copied()
                .unwrap_or(segment.event_id.as_str());
            let width = CELL_WIDTH * segment.span as usize;
            let bar = bar_text(title, width, segment.should_center, tone);
            line.push_str(&self.paint(&bar, tone_code(tone)));
            next_col = segment.end_col + 1;
        }

        line
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn tone_code(tone: EventTone) -> &'static str {
    match tone {
        EventTone::Brand => "1;35",
        EventTone::Muted => "90",
        EventTone::LightBrand => "95",
    }
}

// Greedy row packing for display only; lanes stay in list order.
fn pack_rows<'a>(segments: impl Iterator<Item = &'a Segment>) -> Vec<Vec<&'a Segment>> {
    let mut rows: Vec<Vec<&Segment>> = Vec::new();

    for segment in segments {
        let free = rows.iter_mut().find(|row| {
            row.iter()
                .all(|placed| placed.end_col < segment.col || segment.end_col < placed.col)
        });
        match free {
            Some(row) => row.push(segment),
            None => rows.push(vec![segment]),
        }
    }

    for row in &mut rows {
        row.sort_by_key(|segment| segment.col);
    }
    rows
}

/// A bar exactly `width` columns wide, including a one-column gap.
fn bar_text(title: &str, width: usize, centered: bool, tone: EventTone) -> String {
    let (open, close) = match tone {
        EventTone::Brand => ('[', ']'),
        EventTone::Muted => ('(', ')'),
        EventTone::LightBrand => ('<', '>'),
    };
    let inner_width = width.saturating_sub(3);
    let label = truncate_to_width(title, inner_width);
    let inner = if centered {
        center(&label, inner_width)
    } else {
        pad_right(&label, inner_width)
    };
    format!("{open}{inner}{close} ")
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > width - 1 {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

fn pad_right(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{text}{}", " ".repeat(padding))
}

fn center(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(UnicodeWidthStr::width(text));
    let left = padding / 2;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(padding - left))
}

#[derive(Serialize)]
struct LayoutExport<'a> {
    month: YearMonth,
    events: &'a [CalEvent],
    layout: &'a MonthLayout,
}

pub fn layout_json(layout: &MonthLayout, events: &[CalEvent]) -> anyhow::Result<serde_json::Value> {
    serde_json::to_value(LayoutExport {
        month: layout.grid.month(),
        events,
        layout,
    })
    .context("failed to serialize month layout")
}
