//! The session log and the transcription state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a log message is presented as. Rendering (avatar image vs text)
/// is a projection concern; the model only carries the speaker kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum Speaker {
    System,
    Narrator,
    Player(String),
    World,
    Quest,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::System => write!(f, "System"),
            Speaker::Narrator => write!(f, "Narrator"),
            Speaker::Player(name) => write!(f, "{name}"),
            Speaker::World => write!(f, "World"),
            Speaker::Quest => write!(f, "Quest"),
        }
    }
}

/// One entry of the session log. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    pub speaker: Speaker,
    /// Short label shown next to the timestamp (usually the heading or
    /// the speaker name).
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub body: String,
}

impl LogMessage {
    pub fn new(speaker: Speaker, label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            speaker,
            label: label.into(),
            timestamp: Utc::now(),
            body: body.into(),
        }
    }

    pub fn system(body: impl Into<String>) -> Self {
        Self::new(Speaker::System, "System", body)
    }

    pub fn narrator(body: impl Into<String>) -> Self {
        Self::new(Speaker::Narrator, "Narrator", body)
    }

    pub fn player(name: impl Into<String>, body: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(Speaker::Player(name.clone()), name, body)
    }
}

/// Append-only, insertion-ordered log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionLog {
    messages: Vec<LogMessage>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: LogMessage) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogMessage> {
        self.messages.iter()
    }

    /// Most recent messages, newest first.
    pub fn recent(&self, count: usize) -> Vec<&LogMessage> {
        self.messages.iter().rev().take(count).collect()
    }

    pub fn last(&self) -> Option<&LogMessage> {
        self.messages.last()
    }
}

/// Transcription capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionState {
    #[default]
    Idle,
    Recording,
    Paused,
}

/// State machine for the transcription controls.
///
/// Every control action is idempotent-safe: an action that does not
/// apply in the current state changes nothing and emits nothing.
/// Actions that do fire return the system log message to append.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcription {
    state: TranscriptionState,
}

impl Transcription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TranscriptionState {
        self.state
    }

    /// Start (or resume) capture. No-op while already recording.
    pub fn start(&mut self) -> Option<LogMessage> {
        match self.state {
            TranscriptionState::Idle => {
                self.state = TranscriptionState::Recording;
                Some(LogMessage::system("Transcription started"))
            }
            TranscriptionState::Paused => {
                self.state = TranscriptionState::Recording;
                Some(LogMessage::system("Transcription resumed"))
            }
            TranscriptionState::Recording => None,
        }
    }

    /// Toggle between recording and paused. No-op from idle.
    pub fn pause_resume(&mut self) -> Option<LogMessage> {
        match self.state {
            TranscriptionState::Recording => {
                self.state = TranscriptionState::Paused;
                Some(LogMessage::system("Transcription paused"))
            }
            TranscriptionState::Paused => {
                self.state = TranscriptionState::Recording;
                Some(LogMessage::system("Transcription resumed"))
            }
            TranscriptionState::Idle => None,
        }
    }

    /// Stop capture from any non-idle state. No-op from idle.
    pub fn stop(&mut self) -> Option<LogMessage> {
        match self.state {
            TranscriptionState::Recording | TranscriptionState::Paused => {
                self.state = TranscriptionState::Idle;
                Some(LogMessage::system("Transcription stopped"))
            }
            TranscriptionState::Idle => None,
        }
    }
}
