//! Tabletop session companion engine.
//!
//! This crate provides:
//! - A session log and transcription state machine
//! - Quest tracking with a derived global timeline
//! - Character mechanics (damage, healing, rests, concentration)
//! - Party inventory
//! - JSON persistence with export/import
//! - A router for the pre-formatted narration feed
//!
//! # Quick Start
//!
//! ```ignore
//! use companion_core::{route, SessionState, Store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::new("companion_data");
//!     let mut state = SessionState::load(&store).await?;
//!
//!     state.transcription_start();
//!     route(
//!         &mut state,
//!         r#"{"heading":"Quest Update","quest_name":"The Missing Caravan","content":"Tracks found."}"#,
//!     );
//!
//!     for entry in state.timeline() {
//!         println!("{}: {}", entry.title, entry.text);
//!     }
//!
//!     state.save(&store).await?;
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod character;
pub mod dice;
pub mod inventory;
pub mod log;
pub mod router;
pub mod session;
pub mod store;
pub mod timeline;

// Primary public API
pub use character::{Character, CharacterId, DamageOutcome, RestOutcome};
pub use dice::{Advantage, D20Roll, DieType};
pub use inventory::{Inventory, InventoryItem, ItemKind};
pub use log::{LogMessage, SessionLog, Speaker, TranscriptionState};
pub use router::{route, InboundMessage, Outcome};
pub use session::SessionState;
pub use store::{PersistError, Store};
pub use timeline::{aggregate, Quest, QuestEvent, QuestStatus, TimelineEntry, TimelineTag};
