//! Choosing which events to keep from each slot.
//!
//! The picker walks slots in order and asks a `SelectionSurface` to resolve
//! each one. The surface only moves text around (a terminal prompt in the
//! CLI, a script in tests); validating answers and re-asking lives here.

use std::io;

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::SchedResult;
use crate::event::Event;
use crate::slot::Slot;

/// Events chosen across all slots, in slot order.
pub type Selection<'a> = Vec<&'a Event>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMode {
    /// Ask for at most one event per slot
    Interactive,
    /// Keep the whole schedule
    TakeAll,
}

/// What the surface is asked for one slot.
#[derive(Debug, Clone, Copy)]
pub enum Question<'q> {
    /// Single event in the slot: answer "y" or "n"
    Attend(&'q Event),
    /// Competing events: answer a number from 1 to N, or "n"
    Which(&'q [&'q Event]),
}

/// A resolved answer. `Take` holds a zero-based position in the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Take(usize),
    Skip,
}

/// An answer outside the accepted set; the question is asked again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' is not a valid choice, expected {expected}")]
pub struct InvalidInput {
    pub input: String,
    pub expected: String,
}

impl Question<'_> {
    pub fn parse_answer(&self, input: &str) -> Result<Answer, InvalidInput> {
        let answer = input.trim().to_ascii_lowercase();

        if answer == "n" {
            return Ok(Answer::Skip);
        }

        match self {
            Question::Attend(_) if answer == "y" => Ok(Answer::Take(0)),
            Question::Attend(_) => Err(InvalidInput {
                input: input.trim().to_string(),
                expected: "'y' or 'n'".to_string(),
            }),
            Question::Which(events) => match answer.parse::<usize>() {
                Ok(n) if (1..=events.len()).contains(&n) => Ok(Answer::Take(n - 1)),
                _ => Err(InvalidInput {
                    input: input.trim().to_string(),
                    expected: format!("a number from 1 to {} or 'n'", events.len()),
                }),
            },
        }
    }
}

/// Interactive front end the picker talks to.
pub trait SelectionSurface {
    /// Called before the first slot of each new day.
    fn begin_day(&mut self, day: NaiveDate) -> io::Result<()>;

    /// Present the question and return the raw answer.
    fn ask(&mut self, question: &Question<'_>) -> io::Result<String>;

    /// Tell the user their last answer was not accepted.
    fn reject(&mut self, _invalid: &InvalidInput) -> io::Result<()> {
        Ok(())
    }
}

/// Resolve every slot to zero or one event (or all of them in `TakeAll`).
pub fn pick_events<'a, S>(
    slots: &[Slot<'a>],
    mode: PickMode,
    surface: &mut S,
) -> SchedResult<Selection<'a>>
where
    S: SelectionSurface + ?Sized,
{
    if mode == PickMode::TakeAll {
        return Ok(slots
            .iter()
            .flat_map(|slot| slot.events().iter().copied())
            .collect());
    }

    let (picked, _) = slots.iter().try_fold(
        (Selection::new(), None::<NaiveDate>),
        |(mut picked, last_day), slot| {
            if last_day != Some(slot.day()) {
                surface.begin_day(slot.day())?;
            }
            if let Some(event) = pick_slot(slot, surface)? {
                picked.push(event);
            }
            SchedResult::Ok((picked, Some(slot.day())))
        },
    )?;

    tracing::debug!(picked = picked.len(), slots = slots.len(), "selection complete");
    Ok(picked)
}

fn pick_slot<'a, S>(slot: &Slot<'a>, surface: &mut S) -> SchedResult<Option<&'a Event>>
where
    S: SelectionSurface + ?Sized,
{
    let events = slot.events();
    let question = match events {
        [only] => Question::Attend(*only),
        many => Question::Which(many),
    };

    loop {
        let input = surface.ask(&question)?;

        match question.parse_answer(&input) {
            Ok(Answer::Take(i)) => return Ok(events.get(i).copied()),
            Ok(Answer::Skip) => return Ok(None),
            Err(invalid) => {
                tracing::debug!(%invalid, at = %slot.start(), "re-asking");
                surface.reject(&invalid)?;
            }
        }
    }
}
