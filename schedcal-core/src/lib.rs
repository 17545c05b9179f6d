//! Core of schedcal.
//!
//! - `schedule`: download and parse a conference schedule page into `Event`s
//! - `slot`: group events that start at the same time
//! - `pick`: choose one event per slot, interactively or all at once
//! - `export`: map events to calendar payloads and upload them through a `CalendarService`

pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod pick;
pub mod schedule;
pub mod slot;

// Re-export the event types at crate root for convenience
pub use event::*;
