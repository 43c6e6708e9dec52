use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use crate::config::ApiConfig;
use crate::datetime::YearMonth;
use crate::schedule::{DiarySchedule, parse_schedules};
use crate::session::Session;

const NOT_FOUND: u16 = 404;

/// Raw answer of the month diary endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: String,
}

/// Anything that can answer "which schedules does this month have".
pub trait ScheduleSource {
    fn fetch_month(
        &self,
        month: YearMonth,
    ) -> impl Future<Output = anyhow::Result<FetchedResponse>>;
}

#[derive(Debug, Clone)]
pub struct HttpScheduleSource {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl HttpScheduleSource {
    /// The session is taken explicitly; nothing here reads stored
    /// credentials on its own.
    pub fn new(api: &ApiConfig, session: &Session) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .context("failed building HTTP client for diary requests")?;

        if !session.is_authenticated() {
            warn!("no access token in session; requesting diary anonymously");
        }

        Ok(Self {
            client,
            endpoint: api.diary_endpoint(),
            access_token: session.bearer_token().map(str::to_string),
        })
    }

    pub fn month_url(&self, month: YearMonth) -> String {
        format!(
            "{}?year={}&month={:02}",
            self.endpoint,
            month.year(),
            month.month()
        )
    }
}

impl ScheduleSource for HttpScheduleSource {
    async fn fetch_month(&self, month: YearMonth) -> anyhow::Result<FetchedResponse> {
        let url = self.month_url(month);
        let mut request = self
            .client
            .get(url.as_str())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        debug!(url = %url, "requesting month diary");
        let response = request
            .send()
            .await
            .with_context(|| format!("failed requesting {url}"))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed reading response body from {url}"))?;

        Ok(FetchedResponse { status, body })
    }
}

/// 2xx bodies are parsed, 404 means the month has no entries, and anything
/// else is logged and treated as empty.
pub fn interpret_response(month: YearMonth, response: &FetchedResponse) -> Vec<DiarySchedule> {
    let status = response.status;
    if (200..300).contains(&status) {
        if response.body.trim().is_empty() {
            return Vec::new();
        }
        return match parse_schedules(&response.body) {
            Ok(schedules) => schedules,
            Err(err) => {
                error!(
                    month = %month,
                    error = %format!("{err:#}"),
                    "month diary response was not a schedule list"
                );
                Vec::new()
            }
        };
    }

    if status == NOT_FOUND {
        info!(month = %month, "no diary entries for month");
        return Vec::new();
    }

    warn!(month = %month, status, "month diary request failed; showing no events");
    Vec::new()
}

/// Fetches one month. Never fails: transport errors are logged and the month
/// renders empty. No retries.
#[tracing::instrument(skip(source))]
pub async fn load_month_schedules<S>(source: &S, month: YearMonth) -> Vec<DiarySchedule>
where
    S: ScheduleSource,
{
    match source.fetch_month(month).await {
        Ok(response) => {
            let schedules = interpret_response(month, &response);
            debug!(status = response.status, count = schedules.len(), "month diary loaded");
            schedules
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "failed fetching month diary");
            Vec::new()
        }
    }
}

/// Drives a future to completion on a current-thread runtime.
pub fn run_async<T>(future: impl Future<Output = T>) -> anyhow::Result<T> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed building async runtime")?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june() -> YearMonth {
        "2024-06".parse().expect("valid month")
    }

    fn response(status: u16, body: &str) -> FetchedResponse {
        FetchedResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn not_found_matches_empty_list() {
        let missing = interpret_response(june(), &response(404, "Not Found"));
        let empty = interpret_response(june(), &response(200, "[]"));
        assert_eq!(missing, empty);
        assert!(missing.is_empty());
    }

    #[test]
    fn success_body_is_parsed() {
        let schedules = interpret_response(
            june(),
            &response(
                200,
                r#"[{"title": "Trip", "startDate": "2024-06-01", "endDate": "2024-06-02"}]"#,
            ),
        );
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].title, "Trip");
    }

    #[test]
    fn failures_fail_open() {
        assert!(interpret_response(june(), &response(500, "boom")).is_empty());
        assert!(interpret_response(june(), &response(401, "")).is_empty());
        assert!(interpret_response(june(), &response(200, "<html>")).is_empty());
        assert!(interpret_response(june(), &response(204, "")).is_empty());
    }

    #[test]
    fn month_url_carries_year_and_month() {
        let api = ApiConfig {
            base_url: "https://api.example.com/".to_string(),
            ..ApiConfig::default()
        };
        let session = Session {
            access_token: Some("token".to_string()),
            ..Session::default()
        };
        let source = HttpScheduleSource::new(&api, &session).expect("build source");
        assert_eq!(
            source.month_url(june()),
            "https://api.example.com/diary?year=2024&month=06"
        );
        assert_eq!(source.access_token.as_deref(), Some("token"));
    }
}
