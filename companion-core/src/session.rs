//! The owned session state.
//!
//! Everything the dashboard projects comes from here: the log, the
//! quest list, the derived timeline, the party, the inventory, and the
//! transcription controls. All mutation goes through methods so the
//! timeline can always be re-derived from the current quest list plus
//! the entries the narration feed pushed directly.

use crate::character::Character;
use crate::inventory::Inventory;
use crate::log::{SessionLog, Transcription, TranscriptionState};
use crate::store::{PersistError, Store};
use crate::timeline::{self, Quest, QuestEvent, TimelineEntry};
use uuid::Uuid;

/// How many quests the feed keeps in the "recently shown" list.
pub const RECENT_QUESTS_SHOWN: usize = 2;

/// Full in-memory state of one companion session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub log: SessionLog,
    pub quests: Vec<Quest>,
    pub characters: Vec<Character>,
    pub inventory: Inventory,
    pub transcription: Transcription,
    recent_quests: Vec<String>,
    feed_entries: Vec<TimelineEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the persisted collections; log and transcription state start
    /// fresh each session.
    pub async fn load(store: &Store) -> Result<Self, PersistError> {
        Ok(Self {
            quests: store.load_quests().await?,
            characters: store.load_characters().await?,
            inventory: store.load_inventory().await?,
            ..Self::default()
        })
    }

    /// Persist the collections wholesale.
    pub async fn save(&self, store: &Store) -> Result<(), PersistError> {
        store.save_quests(&self.quests).await?;
        store.save_characters(&self.characters).await?;
        store.save_inventory(&self.inventory).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Quests and timeline
    // ------------------------------------------------------------------

    pub fn add_quest(&mut self, quest: Quest) -> Uuid {
        let id = quest.id;
        self.quests.push(quest);
        id
    }

    pub fn quest(&self, id: Uuid) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn quest_mut(&mut self, id: Uuid) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|q| q.id == id)
    }

    /// Record an event on a quest. Returns false if the quest is unknown.
    pub fn add_quest_event(&mut self, quest_id: Uuid, event: QuestEvent) -> bool {
        match self.quest_mut(quest_id) {
            Some(quest) => {
                quest.add_event(event);
                true
            }
            None => false,
        }
    }

    pub fn complete_quest(&mut self, quest_id: Uuid) -> bool {
        self.quest_mut(quest_id).is_some_and(|q| q.complete())
    }

    pub fn fail_quest(&mut self, quest_id: Uuid) -> bool {
        self.quest_mut(quest_id).is_some_and(|q| q.fail())
    }

    /// The global timeline: the aggregate derived from the quest list,
    /// merged with the entries the feed pushed directly, newest first.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        let mut entries = timeline::aggregate(&self.quests);
        entries.extend(self.feed_entries.iter().cloned());
        timeline::sort_descending(&mut entries);
        entries
    }

    /// Push a timeline entry that is not owned by any quest (used by the
    /// inbound message router).
    pub fn push_feed_entry(&mut self, entry: TimelineEntry) {
        self.feed_entries.push(entry);
    }

    /// Prepend a quest name to the recently-shown list, capped at
    /// [`RECENT_QUESTS_SHOWN`].
    pub fn note_recent_quest(&mut self, name: impl Into<String>) {
        self.recent_quests.insert(0, name.into());
        self.recent_quests.truncate(RECENT_QUESTS_SHOWN);
    }

    pub fn recent_quests(&self) -> &[String] {
        &self.recent_quests
    }

    // ------------------------------------------------------------------
    // Party
    // ------------------------------------------------------------------

    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    pub fn character_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.name == name)
    }

    // ------------------------------------------------------------------
    // Transcription controls
    // ------------------------------------------------------------------

    pub fn transcription_start(&mut self) -> TranscriptionState {
        if let Some(msg) = self.transcription.start() {
            self.log.push(msg);
        }
        self.transcription.state()
    }

    pub fn transcription_pause_resume(&mut self) -> TranscriptionState {
        if let Some(msg) = self.transcription.pause_resume() {
            self.log.push(msg);
        }
        self.transcription.state()
    }

    pub fn transcription_stop(&mut self) -> TranscriptionState {
        if let Some(msg) = self.transcription.stop() {
            self.log.push(msg);
        }
        self.transcription.state()
    }
}
