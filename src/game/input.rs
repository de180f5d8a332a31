//! Controller Input
//!
//! Fighters move on their own, so the only inputs are between matches:
//! starting a match from a roster and skipping the round-end screen.

use serde::{Serialize, Deserialize};

use crate::game::state::{CharacterKind, UnknownCharacter};

/// An input event handed to `MatchController::advance`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "roster", rename_all = "snake_case")]
pub enum InputEvent {
    /// Start a match with this roster (selection screen only)
    StartMatch(Vec<CharacterKind>),
    /// Leave the round-end screen immediately
    Restart,
}

impl InputEvent {
    /// Build a start event from roster names.
    pub fn start_named(names: &[&str]) -> Result<Self, UnknownCharacter> {
        let roster = parse_roster(names)?;
        Ok(InputEvent::StartMatch(roster))
    }
}

/// Parse roster names into kinds, failing on the first unknown name.
pub fn parse_roster<S: AsRef<str>>(names: &[S]) -> Result<Vec<CharacterKind>, UnknownCharacter> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}
