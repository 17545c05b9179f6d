//! Terminal front end for the picker.

use std::io::{self, BufRead, IsTerminal, Write};

use chrono::NaiveDate;
use dialoguer::Input;
use owo_colors::OwoColorize;
use schedcal_core::pick::{InvalidInput, Question, SelectionSurface};

use crate::render::{Render, render_day_header};

/// Blocking line prompts. Uses dialoguer on a terminal and plain lines
/// when answers are piped in.
#[derive(Default)]
pub struct TerminalSurface {
    /// Set after a rejected answer so the options are not listed twice.
    reasking: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionSurface for TerminalSurface {
    fn begin_day(&mut self, day: NaiveDate) -> io::Result<()> {
        println!("\n{}\n", render_day_header(day));
        Ok(())
    }

    fn ask(&mut self, question: &Question<'_>) -> io::Result<String> {
        let prompt = match question {
            Question::Attend(event) => {
                if !self.reasking {
                    println!("Would you like to attend {}?", event.render());
                }
                "  Press 'y' for yes, 'n' to skip it"
            }
            Question::Which(events) => {
                if !self.reasking {
                    println!("Which of the following talks would you like to attend?");
                    for (i, event) in events.iter().enumerate() {
                        println!("  {}) {}", (i + 1).bold(), event.render());
                    }
                }
                "  Press the number of a talk to select it, or 'n' to skip"
            }
        };
        self.reasking = false;

        let answer = if io::stdin().is_terminal() {
            Input::<String>::new()
                .with_prompt(prompt)
                .interact_text()
                .map_err(io::Error::other)?
        } else {
            print!("{prompt}: ");
            io::stdout().flush()?;
            read_answer(&mut io::stdin().lock())?
        };

        println!();
        Ok(answer)
    }

    fn reject(&mut self, invalid: &InvalidInput) -> io::Result<()> {
        eprintln!("  {}", invalid.to_string().red());
        self.reasking = true;
        Ok(())
    }
}

/// One answer from piped input. End of input is an error so the
/// picker does not keep asking forever.
fn read_answer(reader: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input ended before every slot was answered",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn piped_answers_are_read_line_by_line() {
        let mut input = Cursor::new("y\r\n2\nn");

        assert_eq!(read_answer(&mut input).unwrap(), "y");
        assert_eq!(read_answer(&mut input).unwrap(), "2");
        assert_eq!(read_answer(&mut input).unwrap(), "n");
    }

    #[test]
    fn end_of_piped_input_is_an_error() {
        let mut input = Cursor::new("");

        let err = read_answer(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
