//! Inbound message router for the narration feed.
//!
//! The feed pushes pre-formatted JSON objects classified by a `heading`
//! field. The router applies each message to the session state: first
//! matching rule wins, unrecognized messages and unparseable payloads
//! are dropped without error.

use crate::log::{LogMessage, Speaker};
use crate::session::SessionState;
use crate::timeline::{TimelineEntry, TimelineTag};
use serde::Deserialize;

/// Wire shape of one feed message. Every field is optional; the router
/// decides what applies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    pub heading: Option<String>,
    pub content: Option<String>,
    pub quest_name: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
}

/// What the router did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    QuestUpdate,
    WorldUpdate,
    CharacterEntry,
    Summary,
    Ignored,
}

/// Parse and apply one raw feed payload. Malformed JSON is swallowed:
/// no entry is produced and no error surfaces.
pub fn route(state: &mut SessionState, raw: &str) -> Outcome {
    match serde_json::from_str::<InboundMessage>(raw) {
        Ok(message) => apply(state, message),
        Err(_) => Outcome::Ignored,
    }
}

/// Apply an already-parsed feed message.
pub fn apply(state: &mut SessionState, message: InboundMessage) -> Outcome {
    let content = message.content.unwrap_or_default();

    if let Some(heading) = message.heading.as_deref() {
        if heading == "Quest Update" {
            let quest_name = message.quest_name.unwrap_or_else(|| "Quest".to_string());
            state
                .log
                .push(LogMessage::new(Speaker::Quest, &quest_name, &content));

            let mut entry = TimelineEntry::feed(TimelineTag::Quest, &quest_name, &content);
            if let Some(location) = message.location {
                entry = entry.with_location(location);
            }
            state.push_feed_entry(entry);

            state.note_recent_quest(quest_name);
            // Quest updates short-circuit the remaining rules.
            return Outcome::QuestUpdate;
        }

        if heading == "World State Update" {
            state
                .log
                .push(LogMessage::new(Speaker::World, heading, &content));

            let mut entry = TimelineEntry::feed(TimelineTag::Location, "Location Changed", &content);
            if let Some(location) = message.location {
                entry = entry.with_location(location);
            }
            state.push_feed_entry(entry);
            return Outcome::WorldUpdate;
        }

        if heading.starts_with("Character Action") || heading.starts_with("Character Outcome") {
            let name = heading
                .split_once(':')
                .map(|(_, name)| name.trim())
                .filter(|name| !name.is_empty())
                .unwrap_or("Unknown");

            let entry = if name.eq_ignore_ascii_case("narrator") {
                LogMessage::narrator(&content)
            } else {
                LogMessage::player(name, &content)
            };
            state.log.push(entry);
            return Outcome::CharacterEntry;
        }
    }

    if message.kind.as_deref() == Some("summary") {
        state
            .log
            .push(LogMessage::system(message.text.unwrap_or_default()));
        return Outcome::Summary;
    }

    Outcome::Ignored
}
