use std::fs;

use chrono::{NaiveDate, Weekday};
use tempfile::tempdir;
use twogether_core::calendar::{CalendarState, DayAction, resolve_day_click};
use twogether_core::client::{FetchedResponse, ScheduleSource, load_month_schedules};
use twogether_core::datetime::YearMonth;
use twogether_core::layout::{EventState, LayoutPolicy, MonthGrid, MonthLayout};
use twogether_core::render::{Renderer, layout_json};
use twogether_core::schedule::{ingest, load_schedules_file};
use twogether_core::session::{PartnerInfo, Session, SessionStore, SessionUser};

fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

const JUNE_PAYLOAD: &str = r#"[
  {"diaryId": 11, "title": "Jeju trip", "startDate": "2024-06-03", "endDate": "2024-06-05"},
  {"diaryId": 12, "title": "Dinner", "startDate": "2024-06-04", "endDate": "2024-06-04"},
  {"title": "Exams", "startDate": "2024-06-10", "endDate": "2024-06-20"}
]"#;

#[test]
fn file_schedules_render_as_month_grid() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("june.json");
    fs::write(&path, JUNE_PAYLOAD).expect("write payload");

    let schedules = load_schedules_file(&path).expect("load schedules");
    let events = ingest(&schedules);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].id.as_str(), "diary-11");

    let month = YearMonth::new(2024, 6).expect("valid month");
    let grid = MonthGrid::new(month, Weekday::Sun, false);
    let layout = MonthLayout::compute(&events, &grid, day("2024-06-04"), &LayoutPolicy::default());

    let trip = layout
        .segments
        .iter()
        .find(|segment| segment.event_id == events[0].id)
        .expect("trip segment");
    assert_eq!((trip.week, trip.col, trip.span, trip.end_col), (2, 2, 3, 4));
    assert!(trip.should_center);
    assert_eq!(trip.offset_px, 28);

    assert_eq!(
        layout.state_of(&events[0].id).map(|s| s.state),
        Some(EventState::Ongoing)
    );
    assert_eq!(
        layout.state_of(&events[2].id).map(|s| s.state),
        Some(EventState::Upcoming)
    );

    let text = Renderer::plain().render_month(&layout, &events);
    assert!(text.contains("June 2024"));
    assert!(text.contains("Jeju trip"));
    assert!(!text.contains('\x1b'));

    let json = layout_json(&layout, &events).expect("layout json");
    assert_eq!(json["month"], "2024-06");
    assert_eq!(json["events"].as_array().map(Vec::len), Some(3));
}

#[test]
fn day_click_through_calendar_state() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("june.json");
    fs::write(&path, JUNE_PAYLOAD).expect("write payload");

    let month = YearMonth::new(2024, 6).expect("valid month");
    let mut state = CalendarState::new(month);
    let ticket = state.request_current();
    assert!(state.apply(&ticket, load_schedules_file(&path).expect("load")));

    let events = state.events();
    match resolve_day_click(&events, day("2024-06-04")) {
        DayAction::ChooseSchedule { candidates, .. } => assert_eq!(candidates.len(), 2),
        other => panic!("expected a choice, got {other:?}"),
    }
    assert_eq!(
        resolve_day_click(&events, day("2024-06-12")),
        DayAction::OpenDetail { date: day("2024-06-12") }
    );
}

enum Canned {
    Status(u16, &'static str),
    Broken,
}

struct FakeSource(Canned);

impl ScheduleSource for FakeSource {
    async fn fetch_month(&self, _month: YearMonth) -> anyhow::Result<FetchedResponse> {
        match &self.0 {
            Canned::Status(status, body) => Ok(FetchedResponse {
                status: *status,
                body: (*body).to_string(),
            }),
            Canned::Broken => Err(anyhow::anyhow!("connection refused")),
        }
    }
}

#[tokio::test]
async fn backend_failures_render_an_empty_month() {
    let month = YearMonth::new(2024, 6).expect("valid month");

    let empty = load_month_schedules(&FakeSource(Canned::Status(200, "[]")), month).await;
    let missing =
        load_month_schedules(&FakeSource(Canned::Status(404, "Not Found")), month).await;
    let failed = load_month_schedules(&FakeSource(Canned::Status(500, "oops")), month).await;
    let broken = load_month_schedules(&FakeSource(Canned::Broken), month).await;

    assert!(empty.is_empty());
    assert_eq!(missing, empty);
    assert!(failed.is_empty());
    assert!(broken.is_empty());

    let loaded = load_month_schedules(&FakeSource(Canned::Status(200, JUNE_PAYLOAD)), month).await;
    assert_eq!(loaded.len(), 3);
}

#[tokio::test]
async fn stale_month_response_is_dropped() {
    let june = YearMonth::new(2024, 6).expect("valid month");
    let mut state = CalendarState::new(june);
    let june_ticket = state.request_current();
    let july_ticket = state.navigate(1);

    let june_rows =
        load_month_schedules(&FakeSource(Canned::Status(200, JUNE_PAYLOAD)), june).await;
    assert!(!state.apply(&june_ticket, june_rows));
    assert!(state.apply(&july_ticket, Vec::new()));
    assert!(state.events().is_empty());
    assert_eq!(state.loaded_month(), Some(july_ticket.month()));
}

#[test]
fn session_round_trip_and_clear() {
    let temp = tempdir().expect("tempdir");
    let store = SessionStore::new(temp.path().join("nested").join("session.json"));

    assert_eq!(store.load().expect("load missing"), Session::default());

    let session = Session {
        access_token: Some("abc".to_string()),
        user: Some(SessionUser {
            user_id: "u-1".to_string(),
            nickname: Some("Mina".to_string()),
        }),
        partner: Some(PartnerInfo {
            partner_id: None,
            nickname: None,
            link_code: Some("LINK42".to_string()),
        }),
    };
    store.save(&session).expect("save session");
    let loaded = store.load().expect("load session");
    assert_eq!(loaded, session);
    assert_eq!(loaded.bearer_token(), Some("abc"));

    store.clear().expect("clear session");
    assert!(!store.load().expect("load cleared").is_authenticated());
}
