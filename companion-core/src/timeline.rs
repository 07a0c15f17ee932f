//! Quests, quest events, and the derived session timeline.
//!
//! The timeline is never stored: it is recomputed wholesale from the
//! quest list after every mutation. At the scale of a single campaign's
//! session log that is a handful of entries, so O(total events) per
//! recompute is fine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What kind of beat a quest event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestEventKind {
    Milestone,
    Dialogue,
    Action,
    Discovery,
    Combat,
}

impl QuestEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestEventKind::Milestone => "Milestone",
            QuestEventKind::Dialogue => "Dialogue",
            QuestEventKind::Action => "Action",
            QuestEventKind::Discovery => "Discovery",
            QuestEventKind::Combat => "Combat",
        }
    }
}

impl fmt::Display for QuestEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An event owned by a quest. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: QuestEventKind,
    pub text: String,
    pub location: Option<String>,
}

impl QuestEvent {
    pub fn new(kind: QuestEventKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            text: text.into(),
            location: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Quest lifecycle. Transitions out of Active are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Active,
    Completed,
    Failed,
}

/// A quest and its ordered event history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: QuestStatus,
    pub assigned_character: Option<String>,
    pub created_at: DateTime<Utc>,
    pub events: Vec<QuestEvent>,
}

impl Quest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            status: QuestStatus::Active,
            assigned_character: None,
            created_at: Utc::now(),
            events: Vec::new(),
        }
    }

    pub fn created_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_at = timestamp;
        self
    }

    pub fn assigned_to(mut self, character: impl Into<String>) -> Self {
        self.assigned_character = Some(character.into());
        self
    }

    pub fn add_event(&mut self, event: QuestEvent) {
        self.events.push(event);
    }

    pub fn is_terminal(&self) -> bool {
        self.status != QuestStatus::Active
    }

    /// Mark completed. Returns false from a terminal state, which is
    /// left unchanged.
    pub fn complete(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = QuestStatus::Completed;
        true
    }

    /// Mark failed. Returns false from a terminal state.
    pub fn fail(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = QuestStatus::Failed;
        true
    }
}

/// Tag describing where a timeline entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineTag {
    /// Synthetic entry marking a quest's creation.
    QuestCreated,
    /// A quest event, or a quest update pushed by the narration feed.
    Quest,
    /// A location change pushed by the narration feed.
    Location,
}

/// One row of the global timeline. Derived data, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub quest_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub tag: TimelineTag,
    pub title: String,
    pub text: String,
    pub location: Option<String>,
}

impl TimelineEntry {
    fn quest_created(quest: &Quest) -> Self {
        Self {
            quest_id: Some(quest.id),
            timestamp: quest.created_at,
            tag: TimelineTag::QuestCreated,
            title: quest.title.clone(),
            text: format!("Quest started: {}", quest.title),
            location: None,
        }
    }

    fn from_event(quest: &Quest, event: &QuestEvent) -> Self {
        Self {
            quest_id: Some(quest.id),
            timestamp: event.timestamp,
            tag: TimelineTag::Quest,
            title: format!("{}: {}", quest.title, event.kind),
            text: event.text.clone(),
            location: event.location.clone(),
        }
    }

    /// Entry pushed directly by the feed, not owned by any quest.
    pub fn feed(tag: TimelineTag, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            quest_id: None,
            timestamp: Utc::now(),
            tag,
            title: title.into(),
            text: text.into(),
            location: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Derive the global timeline from the quest list: one synthetic
/// creation entry per quest plus every quest event verbatim, sorted by
/// timestamp descending. The sort is stable, so entries sharing a
/// timestamp keep insertion order.
pub fn aggregate(quests: &[Quest]) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();
    for quest in quests {
        entries.push(TimelineEntry::quest_created(quest));
        for event in &quest.events {
            entries.push(TimelineEntry::from_event(quest, event));
        }
    }
    sort_descending(&mut entries);
    entries
}

/// Stable descending sort by timestamp, shared with the session view
/// that merges feed entries into the derived set.
pub(crate) fn sort_descending(entries: &mut [TimelineEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
