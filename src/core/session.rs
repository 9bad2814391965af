//! # Session
//!
//! The single aggregate a conversation lives in.
//!
//! ```text
//! Session
//! ├── history: Vec<Turn>   // append-only, seeded with the welcome turn
//! ├── step: i64            // dialogue stage reported by the server
//! └── locked: bool         // terminal once true
//! ```
//!
//! Fields are private: the only mutations are the ones the controller performs
//! after a finished exchange. Renderers get `&Session` (or a clone) and read it
//! through accessors.

use serde::{Deserialize, Serialize};

use crate::core::segment::Segment;

/// Step every session starts at.
pub const INITIAL_STEP: i64 = 1;
/// Step at which the server expects a Yes/No confirmation.
pub const CONFIRM_STEP: i64 = 2;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// What a turn carries: user text and assistant fallbacks are plain text,
/// parsed replies are segments.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Segments(Vec<Segment>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub content: TurnContent,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn assistant_segments(segments: Vec<Segment>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: TurnContent::Segments(segments),
        }
    }
}

/// Which input the front end should offer for the current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAffordance {
    /// Free-text box.
    FreeText,
    /// Binary YES / NO choice.
    YesNo,
    /// No input at all; the session is complete.
    Disabled,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    history: Vec<Turn>,
    step: i64,
    locked: bool,
}

impl Session {
    /// Creates a session holding only the assistant's welcome turn.
    pub fn new(welcome: impl Into<String>) -> Self {
        Self {
            history: vec![Turn::assistant_text(welcome)],
            step: INITIAL_STEP,
            locked: false,
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Input affordance for the current `(step, locked)` pair.
    ///
    /// | step       | locked | affordance  |
    /// |------------|--------|-------------|
    /// | any        | true   | `Disabled`  |
    /// | 2          | false  | `YesNo`     |
    /// | any other  | false  | `FreeText`  |
    pub fn affordance(&self) -> InputAffordance {
        match (self.step, self.locked) {
            (_, true) => InputAffordance::Disabled,
            (CONFIRM_STEP, false) => InputAffordance::YesNo,
            (_, false) => InputAffordance::FreeText,
        }
    }

    /// Appends a user turn and its assistant answer in one go.
    pub(crate) fn record_exchange(&mut self, user: Turn, assistant: Turn) {
        self.history.reserve(2);
        self.history.push(user);
        self.history.push(assistant);
    }

    pub(crate) fn set_step(&mut self, step: i64) {
        self.step = step;
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }
}
