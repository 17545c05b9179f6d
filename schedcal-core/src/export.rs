//! Export of selected events to a calendar service.
//!
//! The service itself sits behind `CalendarService`; this module only maps
//! events to the payload shape and drives the calls in order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{SchedError, SchedResult};
use crate::event::Event;

/// Alias the calendar service resolves to the account's main calendar.
pub const PRIMARY_CALENDAR_ID: &str = "primary";

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Where and in which time zone the conference takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub location: String,
    /// IANA zone name, e.g. "America/Montreal"
    pub time_zone: String,
}

/// A calendar listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub summary: String,
}

/// Local date-time plus the zone it is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

/// Body of a create-event call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl EventPayload {
    pub fn from_event(event: &Event, venue: &Venue) -> Self {
        EventPayload {
            summary: format!("{} in {} by {}", event.title, event.track, event.speaker),
            description: event.description.clone(),
            location: venue.location.clone(),
            start: EventDateTime {
                date_time: event.start.format(DATE_TIME_FORMAT).to_string(),
                time_zone: venue.time_zone.clone(),
            },
            end: EventDateTime {
                date_time: event.end.format(DATE_TIME_FORMAT).to_string(),
                time_zone: venue.time_zone.clone(),
            },
        }
    }
}

/// The calls export needs from a calendar service.
#[allow(async_fn_in_trait)]
pub trait CalendarService {
    async fn list_calendars(&self) -> SchedResult<Vec<CalendarEntry>>;

    /// Create a secondary calendar and return its id.
    async fn create_calendar(&self, name: &str, time_zone: &str) -> SchedResult<String>;

    /// Create an event and return its id.
    async fn create_event(&self, calendar_id: &str, payload: &EventPayload) -> SchedResult<String>;
}

/// Find a calendar by name, creating it if the account has none.
pub async fn resolve_calendar<S: CalendarService>(
    service: &S,
    name: &str,
    time_zone: &str,
) -> SchedResult<String> {
    if name == PRIMARY_CALENDAR_ID {
        return Ok(PRIMARY_CALENDAR_ID.to_string());
    }

    let calendars = service.list_calendars().await?;
    if let Some(existing) = calendars.into_iter().find(|c| c.summary == name) {
        tracing::debug!(name, id = %existing.id, "using existing calendar");
        return Ok(existing.id);
    }

    let id = service.create_calendar(name, time_zone).await?;
    tracing::info!(name, %id, "created calendar");
    Ok(id)
}

/// Calendar and event ids produced by a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub calendar_id: String,
    pub event_ids: Vec<String>,
}

/// An export that stopped part way. Events already created stay in place.
#[derive(Error, Debug)]
#[error("{source} ({} events created before the failure)", .created.len())]
pub struct ExportFailure {
    /// None if the calendar itself could not be resolved
    pub calendar_id: Option<String>,
    pub created: Vec<String>,
    #[source]
    pub source: SchedError,
}

/// Upload events one at a time, in order, stopping at the first failure.
pub async fn export_events<S: CalendarService>(
    service: &S,
    calendar_name: &str,
    events: &[&Event],
    venue: &Venue,
) -> Result<ExportReport, ExportFailure> {
    let calendar_id = resolve_calendar(service, calendar_name, &venue.time_zone)
        .await
        .map_err(|source| ExportFailure {
            calendar_id: None,
            created: Vec::new(),
            source,
        })?;

    let mut event_ids = Vec::with_capacity(events.len());

    for event in events {
        let payload = EventPayload::from_event(event, venue);

        match service.create_event(&calendar_id, &payload).await {
            Ok(id) => {
                tracing::debug!(%id, summary = %payload.summary, "created event");
                event_ids.push(id);
            }
            Err(source) => {
                tracing::warn!(summary = %payload.summary, error = %source, "event creation failed");
                return Err(ExportFailure {
                    calendar_id: Some(calendar_id),
                    created: event_ids,
                    source,
                });
            }
        }
    }

    Ok(ExportReport {
        calendar_id,
        event_ids,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use super::*;
    use crate::event::EventKind;

    /// In-memory service that can be told to fail the nth event.
    #[derive(Default)]
    struct FakeService {
        calendars: RefCell<Vec<CalendarEntry>>,
        events: RefCell<Vec<(String, EventPayload)>>,
        fail_event_at: Option<usize>,
    }

    impl CalendarService for FakeService {
        async fn list_calendars(&self) -> SchedResult<Vec<CalendarEntry>> {
            Ok(self.calendars.borrow().clone())
        }

        async fn create_calendar(&self, name: &str, _time_zone: &str) -> SchedResult<String> {
            let id = format!("cal-{}", self.calendars.borrow().len() + 1);
            self.calendars.borrow_mut().push(CalendarEntry {
                id: id.clone(),
                summary: name.to_string(),
            });
            Ok(id)
        }

        async fn create_event(&self, calendar_id: &str, payload: &EventPayload) -> SchedResult<String> {
            let n = self.events.borrow().len();
            if self.fail_event_at == Some(n) {
                return Err(SchedError::ExternalService("403 rateLimitExceeded".into()));
            }
            self.events
                .borrow_mut()
                .push((calendar_id.to_string(), payload.clone()));
            Ok(format!("evt-{}", n + 1))
        }
    }

    fn venue() -> Venue {
        Venue {
            location: "201 Avenue Viger Ouest, Montréal, QC H2Z 1X7, Canada".to_string(),
            time_zone: "America/Montreal".to_string(),
        }
    }

    fn talk(title: &str, h: u32) -> Event {
        let day = NaiveDate::from_ymd_opt(2015, 3, 3).unwrap();
        Event::new(
            EventKind::Talk,
            title,
            "All about it",
            day.and_hms_opt(h, 0, 0).unwrap(),
            day.and_hms_opt(h, 45, 0).unwrap(),
            "Jane Doe",
            "Room 710",
        )
        .unwrap()
    }

    #[test]
    fn payload_maps_event_fields() {
        let payload = EventPayload::from_event(&talk("Intro", 9), &venue());

        assert_eq!(payload.summary, "Intro in Room 710 by Jane Doe");
        assert_eq!(payload.description, "All about it");
        assert_eq!(payload.location, venue().location);
        assert_eq!(payload.start.date_time, "2015-03-03T09:00:00");
        assert_eq!(payload.end.date_time, "2015-03-03T09:45:00");
        assert_eq!(payload.end.time_zone, "America/Montreal");

        // Same input, same payload
        assert_eq!(payload, EventPayload::from_event(&talk("Intro", 9), &venue()));
    }

    #[test]
    fn payload_serializes_with_camel_case_keys() {
        let payload = EventPayload::from_event(&talk("Intro", 9), &venue());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["start"]["dateTime"], "2015-03-03T09:00:00");
        assert_eq!(json["start"]["timeZone"], "America/Montreal");
        assert_eq!(json["summary"], "Intro in Room 710 by Jane Doe");
    }

    #[tokio::test]
    async fn creates_missing_calendar_then_events_in_order() {
        let service = FakeService::default();
        let (a, b) = (talk("A", 9), talk("B", 10));

        let report = export_events(&service, "PyCon15", &[&a, &b], &venue())
            .await
            .unwrap();

        assert_eq!(report.calendar_id, "cal-1");
        assert_eq!(report.event_ids, vec!["evt-1", "evt-2"]);
        let events = service.events.borrow();
        assert_eq!(events[0].1.summary, "A in Room 710 by Jane Doe");
        assert_eq!(events[1].0, "cal-1");
    }

    #[tokio::test]
    async fn reuses_calendar_with_same_name() {
        let service = FakeService::default();
        service.calendars.borrow_mut().push(CalendarEntry {
            id: "existing".into(),
            summary: "PyCon15".into(),
        });

        let id = resolve_calendar(&service, "PyCon15", "America/Montreal")
            .await
            .unwrap();

        assert_eq!(id, "existing");
        assert_eq!(service.calendars.borrow().len(), 1);
    }

    #[tokio::test]
    async fn primary_is_used_as_is() {
        let service = FakeService::default();

        let id = resolve_calendar(&service, "primary", "America/Montreal")
            .await
            .unwrap();

        assert_eq!(id, "primary");
        assert!(service.calendars.borrow().is_empty());
    }

    #[tokio::test]
    async fn failure_reports_events_created_so_far() {
        let service = FakeService {
            fail_event_at: Some(1),
            ..Default::default()
        };
        let (a, b, c) = (talk("A", 9), talk("B", 10), talk("C", 11));

        let failure = export_events(&service, "PyCon15", &[&a, &b, &c], &venue())
            .await
            .unwrap_err();

        assert_eq!(failure.calendar_id.as_deref(), Some("cal-1"));
        assert_eq!(failure.created, vec!["evt-1"]);
        assert!(matches!(failure.source, SchedError::ExternalService(_)));
        assert_eq!(service.events.borrow().len(), 1);
    }
}
