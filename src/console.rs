// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Terminal interaction.
//!
//! Menus and the package selector talk to the user through [`Console`], so
//! they can be driven by scripted input in tests. Lines are handed over as
//! plain text with a [`Tone`]. Styling is up to the console implementation.

use colored::Colorize;
use inquire::{Confirm, InquireError, Text};
use std::io::{self, BufRead, IsTerminal, Write};

/// How a line of output should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Heading,
    Success,
    Warning,
}

/// Layer of indirection for user interaction.
pub trait Console {
    /// Ask user for one line of input.
    ///
    /// Returns [`None`] if user cancelled the prompt or input ended.
    ///
    /// # Errors
    ///
    /// - Return [`ConsoleError`] if the terminal cannot be read.
    fn prompt(&mut self, message: &str) -> Result<Option<String>>;

    /// Ask user a yes or no question.
    ///
    /// Anything other than `y` or `yes` counts as no, including end of input.
    ///
    /// # Errors
    ///
    /// - Return [`ConsoleError`] if the terminal cannot be read.
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let answer = self.prompt(format!("{message} (y/n)").as_str())?;
        Ok(answer.as_deref().is_some_and(is_yes))
    }

    /// Show one line of output.
    fn say(&mut self, tone: Tone, line: &str);
}

/// Console on top of the process terminal.
///
/// Prompts go through inquire when stdin is a terminal. Otherwise lines are
/// read straight from stdin, so input can be piped in.
#[derive(Debug)]
pub struct TerminalConsole {
    interactive: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        if self.interactive {
            return match Text::new(message).prompt() {
                Ok(line) => Ok(Some(line)),
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
                Err(error) => Err(ConsoleError::Prompt(error)),
            };
        }

        print!("{message} ");
        io::stdout().flush().map_err(ConsoleError::Io)?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line).map_err(ConsoleError::Io)?;
        if read == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        if self.interactive {
            return match Confirm::new(message).with_default(false).prompt() {
                Ok(answer) => Ok(answer),
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
                Err(error) => Err(ConsoleError::Prompt(error)),
            };
        }

        let answer = self.prompt(format!("{message} (y/n)").as_str())?;
        Ok(answer.as_deref().is_some_and(is_yes))
    }

    fn say(&mut self, tone: Tone, line: &str) {
        match tone {
            Tone::Plain => println!("{line}"),
            Tone::Heading => println!("{}", line.bold().cyan()),
            Tone::Success => println!("{}", line.green()),
            Tone::Warning => println!("{}", line.yellow()),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// All possible error types for terminal interaction.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Interactive prompt failed.
    #[error(transparent)]
    Prompt(#[from] InquireError),

    /// Reading or writing the terminal failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = ConsoleError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case("y", true; "short yes")]
    #[test_case(" YES ", true; "loud yes")]
    #[test_case("n", false; "no")]
    #[test_case("", false; "empty")]
    #[test_case("yeah", false; "anything else")]
    #[test]
    fn yes_answers(input: &str, expect: bool) {
        assert_eq!(is_yes(input), expect);
    }
}
