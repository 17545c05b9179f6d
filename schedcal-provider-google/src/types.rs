//! Google Calendar v3 wire types.
//!
//! Only the fields schedcal reads or writes are modelled; everything else
//! in Google's responses is ignored.

use serde::{Deserialize, Serialize};

/// GET /users/me/calendarList
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListResponse {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

/// POST /calendars body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendar<'a> {
    pub summary: &'a str,
    pub time_zone: &'a str,
}

/// Any created resource; Google echoes the full object but we only need the id.
#[derive(Debug, Clone, Deserialize)]
pub struct Created {
    pub id: String,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
