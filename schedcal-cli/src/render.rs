//! TUI rendering traits for schedcal types.
//!
//! Extension traits that add colored terminal rendering to schedcal-core
//! types using owo_colors.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use schedcal_core::export::EventPayload;
use schedcal_core::{Event, EventKind};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = self.title.bold().to_string();

        if !self.speaker.is_empty() {
            line.push_str(&format!(" by {}", self.speaker));
        }
        line.push_str(&format!(" {}", self.render_event_time().dimmed()));
        if !self.track.is_empty() {
            line.push_str(&format!(" in {}", self.track.cyan()));
        }
        if self.kind == EventKind::Lightning {
            line.push_str(&format!(" {}", "(lightning)".yellow()));
        }

        line
    }
}

impl Render for EventPayload {
    fn render(&self) -> String {
        format!(
            "{} {}",
            self.summary,
            format!(
                "{} → {} ({})",
                self.start.date_time, self.end.date_time, self.start.time_zone
            )
            .dimmed()
        )
    }
}

/// Banner printed before the first slot of each day.
pub fn render_day_header(day: NaiveDate) -> String {
    let rule = "=".repeat(62);
    let title = format!("Events on {}", day.format("%A, %B %d, %Y"));

    format!("{}\n{:^62}\n{}", rule.dimmed(), title.bold(), rule.dimmed())
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
