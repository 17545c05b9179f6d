//! Schedule event types.
//!
//! An `Event` is one talk, keynote or lightning talk read from a single
//! schedule cell. Events are plain values: the grouper, picker and export
//! adapter only ever borrow them.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{SchedError, SchedResult};

/// Which kind of schedule cell an event was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Structured cell with title link and speaker span
    Talk,
    /// Single text cell encoding "Title - Speaker - Track"
    Lightning,
}

/// A scheduled talk (conference local time, no offset stored)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub speaker: String,
    /// Room or track label
    pub track: String,
    pub kind: EventKind,
}

impl Event {
    /// Build an event, rejecting an empty title or a non-positive duration.
    pub fn new(
        kind: EventKind,
        title: impl Into<String>,
        description: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        speaker: impl Into<String>,
        track: impl Into<String>,
    ) -> SchedResult<Self> {
        let title = title.into();

        if title.trim().is_empty() {
            return Err(SchedError::malformed(format!(
                "event starting at {start} has an empty title"
            )));
        }

        if start >= end {
            return Err(SchedError::malformed(format!(
                "'{title}' ends ({end}) before it starts ({start})"
            )));
        }

        Ok(Event {
            title,
            description: description.into(),
            start,
            end,
            speaker: speaker.into(),
            track: track.into(),
            kind,
        })
    }

    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Start and end in the schedule's 12-hour form, e.g. "09:00AM to 10:15AM".
    pub fn render_event_time(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%I:%M%p"),
            self.end.format("%I:%M%p")
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.speaker.is_empty() {
            write!(f, " by {}", self.speaker)?;
        }
        write!(
            f,
            " from {} to {}",
            self.start.format("%I:%M%p"),
            self.end.format("%I:%M%p")
        )?;
        if !self.track.is_empty() {
            write!(f, " in {}", self.track)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 4, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn rejects_empty_title() {
        let err = Event::new(EventKind::Talk, "  ", "", at(9, 0), at(10, 0), "", "").unwrap_err();
        assert!(matches!(err, SchedError::MalformedSchedule(_)));
    }

    #[test]
    fn rejects_end_before_start() {
        let err =
            Event::new(EventKind::Talk, "Intro", "", at(10, 0), at(10, 0), "", "").unwrap_err();
        assert!(matches!(err, SchedError::MalformedSchedule(_)));
    }

    #[test]
    fn display_omits_empty_speaker_and_track() {
        let event = Event::new(EventKind::Lightning, "Intro", "", at(9, 0), at(10, 15), "", "")
            .unwrap();
        assert_eq!(event.to_string(), "Intro from 09:00AM to 10:15AM");

        let event = Event::new(
            EventKind::Talk,
            "Intro",
            "",
            at(13, 30),
            at(14, 0),
            "Jane Doe",
            "Room 710",
        )
        .unwrap();
        assert_eq!(
            event.to_string(),
            "Intro by Jane Doe from 01:30PM to 02:00PM in Room 710"
        );
    }
}
