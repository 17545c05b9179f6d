//! Conference schedule loading and parsing.
//!
//! The schedule page exposes one `<table>` per conference day, each preceded
//! by a sibling heading holding the day label ("April 10, 2015"). Rows are
//! time slots, columns are rooms, and talks spanning two slots use `rowspan`.

mod parse;
mod source;

pub use parse::{combine_day_and_time, parse_day_label, parse_schedule};
pub use source::{FetchOptions, FileSource, HttpSource, ScheduleSource};

use crate::error::SchedResult;
use crate::event::Event;

/// Fetch the schedule markup once and parse it into events.
pub async fn load_schedule<S: ScheduleSource>(source: &S) -> SchedResult<Vec<Event>> {
    let markup = source.fetch().await?;
    let events = parse_schedule(&markup)?;
    tracing::info!(count = events.len(), "parsed schedule");
    Ok(events)
}
