use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::calendar::{CalendarState, resolve_day_click};
use crate::cli::{Command, DayArgs, MonthArgs, SessionCommand};
use crate::client::{HttpScheduleSource, load_month_schedules, run_async};
use crate::config::AppConfig;
use crate::datetime::{YearMonth, parse_date_key, resolve_timezone, today_in_timezone};
use crate::layout::{MonthGrid, MonthLayout};
use crate::render::{Renderer, layout_json};
use crate::schedule::{CalEvent, load_schedules_file};
use crate::session::{PartnerInfo, SessionStore, SessionUser};

#[instrument(skip(cfg, renderer, command))]
pub fn dispatch(cfg: &AppConfig, renderer: &Renderer, command: Command) -> anyhow::Result<()> {
    debug!(command = ?command, "dispatching command");

    match command {
        Command::Month(args) => cmd_month(cfg, renderer, args),
        Command::Day(args) => cmd_day(cfg, renderer, args),
        Command::Session(sub) => cmd_session(cfg, sub),
    }
}

#[instrument(skip(cfg, renderer, args))]
fn cmd_month(cfg: &AppConfig, renderer: &Renderer, args: MonthArgs) -> anyhow::Result<()> {
    info!("command month");
    print!("{}", month_output(cfg, renderer, &args)?);
    Ok(())
}

fn month_output(cfg: &AppConfig, renderer: &Renderer, args: &MonthArgs) -> anyhow::Result<String> {
    let today = resolve_today(cfg, args.today.as_deref())?;
    let month = match args.month.as_deref() {
        Some(raw) => raw.parse::<YearMonth>().context("invalid month argument")?,
        None => YearMonth::of(today),
    };

    let events = load_events(cfg, month, args.file.as_deref())?;
    let grid = MonthGrid::new(month, cfg.week_start(), cfg.calendar.show_adjacent_days);
    let layout = MonthLayout::compute(&events, &grid, today, &cfg.layout_policy());

    if args.json {
        let value = layout_json(&layout, &events)?;
        Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
    } else {
        Ok(renderer.render_month(&layout, &events))
    }
}

#[instrument(skip(cfg, renderer, args))]
fn cmd_day(cfg: &AppConfig, renderer: &Renderer, args: DayArgs) -> anyhow::Result<()> {
    info!("command day");
    print!("{}", day_output(cfg, renderer, &args)?);
    Ok(())
}

fn day_output(cfg: &AppConfig, renderer: &Renderer, args: &DayArgs) -> anyhow::Result<String> {
    let date = parse_date_key(&args.date).context("invalid date argument")?;
    let events = load_events(cfg, YearMonth::of(date), args.file.as_deref())?;
    let action = resolve_day_click(&events, date);
    debug!(date = %action.date(), "resolved day click");
    Ok(renderer.render_day_action(&action))
}

#[instrument(skip(cfg, command))]
fn cmd_session(cfg: &AppConfig, command: SessionCommand) -> anyhow::Result<()> {
    let store = SessionStore::new(cfg.session_path()?);

    match command {
        SessionCommand::Show => {
            let session = store.load()?;
            println!("file           {}", store.path().display());
            println!("authenticated  {}", session.is_authenticated());
            if let Some(user) = &session.user {
                println!("user           {}", user.user_id);
                if let Some(nickname) = &user.nickname {
                    println!("nickname       {nickname}");
                }
            }
            if let Some(code) = session.partner.as_ref().and_then(|p| p.link_code.as_ref()) {
                println!("partner code   {code}");
            }
            Ok(())
        }
        SessionCommand::Set {
            token,
            user_id,
            nickname,
            partner_code,
        } => {
            let mut session = store.load()?;
            session.access_token = Some(token);
            if let Some(user_id) = user_id {
                session.user = Some(SessionUser { user_id, nickname });
            }
            if let Some(code) = partner_code {
                let partner = session.partner.get_or_insert(PartnerInfo {
                    partner_id: None,
                    nickname: None,
                    link_code: None,
                });
                partner.link_code = Some(code);
            }
            store.save(&session)?;
            println!("Saved session to {}.", store.path().display());
            Ok(())
        }
        SessionCommand::Clear => {
            store.clear()?;
            println!("Signed out.");
            Ok(())
        }
    }
}

fn resolve_today(cfg: &AppConfig, raw: Option<&str>) -> anyhow::Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date_key(raw).context("invalid --today"),
        None => Ok(today_in_timezone(resolve_timezone(cfg.timezone.as_deref()))),
    }
}

/// Schedules for `month`, from a file or the backend. Both paths go through
/// the month tracker so only the response for the request issued last is
/// kept.
fn load_events(cfg: &AppConfig, month: YearMonth, file: Option<&Path>) -> anyhow::Result<Vec<CalEvent>> {
    let mut state = CalendarState::new(month);
    let ticket = state.request_current();

    let schedules = match file {
        Some(path) => load_schedules_file(path)?,
        None => {
            let session = SessionStore::new(cfg.session_path()?).load()?;
            let source = HttpScheduleSource::new(&cfg.api, &session)?;
            run_async(load_month_schedules(&source, month))?
        }
    };

    if !state.apply(&ticket, schedules) {
        debug!(
            generation = ticket.generation(),
            focus = %state.focus(),
            "month response superseded; keeping current schedules"
        );
    }
    Ok(state.events())
}
