//! schedcal-provider-google - Google Calendar provider for schedcal
//!
//! Implements `schedcal_core::export::CalendarService` over the Calendar v3
//! REST API. The caller supplies an OAuth access token; obtaining and
//! storing tokens is left to the user's own tooling.

mod google;
mod types;

pub use google::{CALENDAR_WEB_URL, DEFAULT_BASE_URL, GoogleCalendar};
