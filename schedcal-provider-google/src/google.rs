//! Google Calendar API implementation.

use reqwest::{Client, RequestBuilder, Response};
use schedcal_core::error::{SchedError, SchedResult};
use schedcal_core::export::{CalendarEntry, CalendarService, EventPayload};
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{CalendarListResponse, Created, ErrorResponse, NewCalendar};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Where users can look at the result.
pub const CALENDAR_WEB_URL: &str = "https://www.google.com/calendar/render";

/// Google Calendar client authenticated with an OAuth access token.
pub struct GoogleCalendar {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl GoogleCalendar {
    pub fn new(access_token: impl Into<String>) -> SchedResult<Self> {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    /// Point the client at another API root (used by tests).
    pub fn with_base_url(access_token: impl Into<String>, base_url: &str) -> SchedResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SchedError::Config(format!("Invalid API base URL '{base_url}': {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("schedcal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SchedError::ExternalService(format!("Failed to build HTTP client: {e}")))?;

        Ok(GoogleCalendar {
            client,
            base_url,
            access_token: access_token.into(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> SchedResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SchedError::Config(format!("Invalid API base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> SchedResult<T> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SchedError::ExternalService(format!("Failed to {action}: {e}")))?;

        let response = check_status(response, action).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| SchedError::ExternalService(format!("Failed to {action}: invalid response: {e}")))
    }
}

async fn check_status(response: Response, action: &str) -> SchedResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(SchedError::ExternalService(format!(
        "Failed to {action}: {status} {message}"
    )))
}

impl CalendarService for GoogleCalendar {
    /// Fetch the list of calendars, following pagination.
    async fn list_calendars(&self) -> SchedResult<Vec<CalendarEntry>> {
        let url = self.endpoint(&["users", "me", "calendarList"])?;
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(url.clone());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: CalendarListResponse = self.send(request, "fetch calendars").await?;

            calendars.extend(
                page.items
                    .into_iter()
                    .filter(|c| !c.id.is_empty())
                    .map(|c| CalendarEntry {
                        id: c.id,
                        summary: c.summary,
                    }),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = calendars.len(), "fetched calendars");
        Ok(calendars)
    }

    /// Insert a secondary calendar in the user's calendar list.
    async fn create_calendar(&self, name: &str, time_zone: &str) -> SchedResult<String> {
        let url = self.endpoint(&["calendars"])?;
        let body = NewCalendar {
            summary: name,
            time_zone,
        };

        let created: Created = self
            .send(self.client.post(url).json(&body), "create calendar")
            .await?;

        Ok(created.id)
    }

    async fn create_event(&self, calendar_id: &str, payload: &EventPayload) -> SchedResult<String> {
        let url = self.endpoint(&["calendars", calendar_id, "events"])?;
        let action = format!("create event: {}", payload.summary);

        let created: Created = self
            .send(self.client.post(url).json(payload), &action)
            .await?;

        Ok(created.id)
    }
}
