//! Console command parsing.
//!
//! Commands are a single letter optionally followed by a floor number:
//! `o3` calls the cabin from floor 3, `i7` presses button 7 inside the cabin,
//! `s` prints the current status and `q` quits.

use thiserror::Error;

pub const HELP: &str =
    "Use o{num} for external elevator calls, i{num} for button pushes inside elevator.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    External(i32),
    Internal(i32),
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid command")]
    InvalidCommand,
    #[error("Invalid floor number: {0:?}")]
    InvalidFloor(String),
}

impl InputCommand {
    /// Parse one line of console input. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, InputError> {
        let line = line.trim();
        let mut chars = line.chars();
        let Some(command) = chars.next() else {
            return Ok(None);
        };
        let argument = chars.as_str().trim();

        let command = match command {
            'o' => InputCommand::External(parse_floor(argument)?),
            'i' => InputCommand::Internal(parse_floor(argument)?),
            's' if argument.is_empty() => InputCommand::Status,
            'q' if argument.is_empty() => InputCommand::Quit,
            _ => return Err(InputError::InvalidCommand),
        };
        Ok(Some(command))
    }

    pub fn floor(self) -> Option<i32> {
        match self {
            InputCommand::External(floor) | InputCommand::Internal(floor) => Some(floor),
            InputCommand::Status | InputCommand::Quit => None,
        }
    }
}

fn parse_floor(argument: &str) -> Result<i32, InputError> {
    argument
        .parse()
        .map_err(|_| InputError::InvalidFloor(argument.to_owned()))
}
