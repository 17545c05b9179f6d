//! Schedule parsing using the scraper crate's HTML tree.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use scraper::{ElementRef, Html, Selector};

use crate::error::{SchedError, SchedResult};
use crate::event::{Event, EventKind};

const DAY_LABEL_FORMAT: &str = "%B %d, %Y";
const TIME_LABEL_FORMAT: &str = "%I:%M%p";
const TRACK_HEADER_PREFIX: &str = "Room";
const LIGHTNING_SEPARATOR: &str = " - ";

const TALK_CLASS: &str = "slot-talk";
const LIGHTNING_CLASS: &str = "slot-lightning";

/// Parse the schedule markup into events, in table, row, then column order.
///
/// Fails without returning a partial schedule if any day table does not
/// have the expected header, rows, rowspans or time labels.
pub fn parse_schedule(markup: &str) -> SchedResult<Vec<Event>> {
    let document = Html::parse_document(markup);
    let tables = day_tables(&document)?;

    if tables.is_empty() {
        return Err(SchedError::malformed(
            "no day tables found (expected a <table> preceded by a 'Month DD, YYYY' label)",
        ));
    }

    tracing::debug!(days = tables.len(), "found day tables");

    let mut events = Vec::new();
    for (day, table) in tables {
        parse_day_table(day, table, &mut events)?;
    }

    Ok(events)
}

/// Parse a day heading such as "March 03, 2015".
pub fn parse_day_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label.trim(), DAY_LABEL_FORMAT).ok()
}

/// Combine a day with a 12-hour time label such as "09:00AM" or "1:30 pm".
pub fn combine_day_and_time(day: NaiveDate, time_label: &str) -> SchedResult<NaiveDateTime> {
    let compact: String = time_label.split_whitespace().collect();

    NaiveTime::parse_from_str(&compact, TIME_LABEL_FORMAT)
        .map(|time| day.and_time(time))
        .map_err(|_| {
            SchedError::malformed(format!(
                "invalid time label '{}' on {day}. Expected HH:MMam/pm",
                time_label.trim()
            ))
        })
}

/// Every table whose preceding sibling element carries a day label.
fn day_tables(document: &Html) -> SchedResult<Vec<(NaiveDate, ElementRef<'_>)>> {
    let table_selector = selector("table")?;

    Ok(document
        .select(&table_selector)
        .filter_map(|table| {
            let label = table.prev_siblings().find_map(ElementRef::wrap)?;
            let day = parse_day_label(&element_text(label))?;
            Some((day, table))
        })
        .collect())
}

fn parse_day_table(day: NaiveDate, table: ElementRef<'_>, events: &mut Vec<Event>) -> SchedResult<()> {
    let thead = child_elements(table, "thead")
        .next()
        .ok_or_else(|| SchedError::malformed(format!("table for {day} has no <thead>")))?;
    let header_row = child_elements(thead, "tr")
        .next()
        .ok_or_else(|| SchedError::malformed(format!("table for {day} has no header row")))?;

    let headers: Vec<String> = row_cells(header_row)
        .map(element_text)
        .filter(|label| label.starts_with(TRACK_HEADER_PREFIX))
        .collect();

    let tbody = child_elements(table, "tbody")
        .next()
        .ok_or_else(|| SchedError::malformed(format!("table for {day} has no <tbody>")))?;
    let rows: Vec<ElementRef<'_>> = child_elements(tbody, "tr").collect();

    let times = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row_cells(*row).next().map(element_text).ok_or_else(|| {
                SchedError::malformed(format!("row {} of {day} has no time cell", i + 1))
            })
        })
        .collect::<SchedResult<Vec<String>>>()?;

    for (i, row) in rows.iter().enumerate() {
        for (j, cell) in row_cells(*row).skip(1).enumerate() {
            let Some(class) = cell.value().attr("class") else {
                continue;
            };

            let span = row_span(cell, day, &times[i])?;
            let end_label = times.get(i + span).ok_or_else(|| {
                SchedError::malformed(format!(
                    "slot at {} on {day} spans past the last row",
                    times[i]
                ))
            })?;

            let start = combine_day_and_time(day, &times[i])?;
            let end = combine_day_and_time(day, end_label)?;

            let event = if has_class(cell, LIGHTNING_CLASS) {
                let (title, speaker, track) = split_lightning_text(&element_text(cell));
                Event::new(EventKind::Lightning, title, "", start, end, speaker, track)?
            } else if has_class(cell, TALK_CLASS) {
                talk_event(cell, &headers, j, start, end)?
            } else {
                tracing::debug!(class, at = %start, "skipping decorative cell");
                continue;
            };

            events.push(event);
        }
    }

    Ok(())
}

/// Number of rows a slot cell covers. Schedules only use 1 and 2.
fn row_span(cell: ElementRef<'_>, day: NaiveDate, time: &str) -> SchedResult<usize> {
    match cell.value().attr("rowspan").map(str::trim) {
        None | Some("1") => Ok(1),
        Some("2") => Ok(2),
        Some(other) => Err(SchedError::malformed(format!(
            "unsupported rowspan '{other}' at {time} on {day}"
        ))),
    }
}

fn talk_event(
    cell: ElementRef<'_>,
    headers: &[String],
    column: usize,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> SchedResult<Event> {
    let title_selector = selector(".title")?;
    let speaker_selector = selector(".speaker")?;

    let title_span = cell.select(&title_selector).next().ok_or_else(|| {
        SchedError::malformed(format!("talk at {start} has no title element"))
    })?;
    // The title span wraps a link whose tooltip holds the abstract.
    let link = title_span
        .children()
        .find_map(ElementRef::wrap)
        .unwrap_or(title_span);

    let description: String = link
        .value()
        .attr("title")
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();

    let speaker = cell
        .select(&speaker_selector)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let track = headers.get(column).ok_or_else(|| {
        SchedError::malformed(format!(
            "talk at {start} is in column {} but only {} rooms are listed",
            column + 1,
            headers.len()
        ))
    })?;

    Event::new(
        EventKind::Talk,
        element_text(link),
        description,
        start,
        end,
        speaker,
        track.clone(),
    )
}

/// Split a lightning cell: "Title", "Title - Track" or "Title - Speaker - Track".
pub(crate) fn split_lightning_text(text: &str) -> (String, String, String) {
    let parts: Vec<&str> = text.split(LIGHTNING_SEPARATOR).map(str::trim).collect();

    match parts.as_slice() {
        [title] => (title.to_string(), String::new(), String::new()),
        [title, track] => (title.to_string(), String::new(), track.to_string()),
        [title, speaker, .., track] => (title.to_string(), speaker.to_string(), track.to_string()),
        [] => (String::new(), String::new(), String::new()),
    }
}

fn selector(css: &str) -> SchedResult<Selector> {
    Selector::parse(css).map_err(|e| SchedError::malformed(format!("invalid selector '{css}': {e}")))
}

fn child_elements<'a>(parent: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

fn row_cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Element text with runs of whitespace collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
