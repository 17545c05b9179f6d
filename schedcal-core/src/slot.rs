//! Grouping of parallel events into time slots.

use chrono::{NaiveDate, NaiveDateTime};

use crate::event::Event;

/// Events competing for the same start time, in schedule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<'a> {
    start: NaiveDateTime,
    events: Vec<&'a Event>,
}

impl<'a> Slot<'a> {
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn events(&self) -> &[&'a Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false: a slot is only created around its first event.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Partition events into runs that share a start time.
///
/// Only adjacent events are grouped, so flattening the slots always gives
/// back the input sequence.
pub fn group_slots(events: &[Event]) -> Vec<Slot<'_>> {
    events
        .chunk_by(|a, b| a.start == b.start)
        .map(|run| Slot {
            start: run[0].start,
            events: run.iter().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    fn event(title: &str, day: u32, h: u32) -> Event {
        let start = NaiveDate::from_ymd_opt(2015, 4, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap();
        Event::new(
            EventKind::Talk,
            title,
            "",
            start,
            start + chrono::Duration::minutes(30),
            "",
            "Room 710",
        )
        .unwrap()
    }

    #[test]
    fn empty_input_gives_no_slots() {
        assert!(group_slots(&[]).is_empty());
    }

    #[test]
    fn groups_parallel_talks_and_flattens_back() {
        let events = vec![
            event("a", 10, 9),
            event("b", 10, 9),
            event("c", 10, 10),
            event("d", 11, 9),
            event("e", 11, 9),
            event("f", 11, 9),
        ];

        let slots = group_slots(&events);
        let sizes: Vec<_> = slots.iter().map(Slot::len).collect();
        assert_eq!(sizes, vec![2, 1, 3]);

        let flattened: Vec<Event> = slots
            .iter()
            .flat_map(|s| s.events().iter().map(|e| (*e).clone()))
            .collect();
        assert_eq!(flattened, events);
    }

    #[test]
    fn equal_starts_apart_stay_in_separate_slots() {
        // A second table for the same day restarts at 09:00
        let events = vec![event("a", 10, 9), event("b", 10, 10), event("c", 10, 9)];

        let slots = group_slots(&events);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].start(), slots[2].start());

        let titles: Vec<_> = slots
            .iter()
            .flat_map(|s| s.events().iter().map(|e| e.title.as_str()))
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }
}
