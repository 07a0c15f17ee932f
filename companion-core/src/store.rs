//! Persistence adapter for the session collections.
//!
//! Each logical collection is one JSON array, read and written
//! wholesale under a versioned key (`ds_quests_v1` and friends), one
//! file per key in the store directory. There are no partial updates:
//! callers load a collection, mutate it in memory, and save it back.

use crate::character::{AbilityScores, Character, Spell};
use crate::dice::DieType;
use crate::inventory::{Inventory, InventoryItem, ItemKind};
use crate::timeline::{Quest, QuestEvent, QuestEventKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

/// Collection key for the inventory list.
pub const INVENTORY_KEY: &str = "ds_inventory_v1";
/// Collection key for the character list.
pub const CHARACTERS_KEY: &str = "ds_characters_v1";
/// Collection key for the quest list.
pub const QUESTS_KEY: &str = "ds_quests_v1";

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read a collection wholesale. A missing file yields `None` so the
    /// caller can substitute its sample dataset; malformed JSON is an
    /// error the caller decides how to surface.
    pub async fn load_collection<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<Vec<T>>, PersistError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write a collection wholesale, creating the store directory on
    /// first save.
    pub async fn save_collection<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
    ) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(items)?;
        fs::write(self.path(key), content).await?;
        Ok(())
    }

    pub async fn load_quests(&self) -> Result<Vec<Quest>, PersistError> {
        Ok(self
            .load_collection(QUESTS_KEY)
            .await?
            .unwrap_or_else(sample_quests))
    }

    pub async fn save_quests(&self, quests: &[Quest]) -> Result<(), PersistError> {
        self.save_collection(QUESTS_KEY, quests).await
    }

    pub async fn load_characters(&self) -> Result<Vec<Character>, PersistError> {
        Ok(self
            .load_collection(CHARACTERS_KEY)
            .await?
            .unwrap_or_else(sample_characters))
    }

    pub async fn save_characters(&self, characters: &[Character]) -> Result<(), PersistError> {
        self.save_collection(CHARACTERS_KEY, characters).await
    }

    pub async fn load_inventory(&self) -> Result<Inventory, PersistError> {
        let items = self
            .load_collection(INVENTORY_KEY)
            .await?
            .unwrap_or_else(sample_inventory);
        Ok(Inventory { items })
    }

    pub async fn save_inventory(&self, inventory: &Inventory) -> Result<(), PersistError> {
        self.save_collection(INVENTORY_KEY, &inventory.items).await
    }
}

/// Serialize a collection to the export blob format (a JSON array of
/// objects with `id` fields).
pub fn export_json<T: Serialize>(items: &[T]) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(items)?)
}

/// Parse an imported blob, assigning a fresh id to any entry missing
/// one before decoding.
pub fn import_json<T: DeserializeOwned>(blob: &str) -> Result<Vec<T>, PersistError> {
    let mut values: Vec<Value> = serde_json::from_str(blob)?;
    for value in &mut values {
        if let Value::Object(map) = value {
            let missing = !map.contains_key("id") || map["id"].is_null();
            if missing {
                map.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
        }
    }
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(PersistError::from))
        .collect()
}

/// Starter inventory shown before anything has been saved.
pub fn sample_inventory() -> Vec<InventoryItem> {
    vec![
        InventoryItem::new("Longsword", ItemKind::Weapon)
            .with_description("A well-balanced blade.")
            .with_weight(3.0),
        InventoryItem::new("Healing Potion", ItemKind::Consumable)
            .with_description("Restores 2d4+2 hit points.")
            .with_weight(0.5)
            .with_qty(2),
        InventoryItem::new("Rope (50 ft)", ItemKind::Tool).with_weight(10.0),
    ]
}

/// Starter party shown before anything has been saved.
pub fn sample_characters() -> Vec<Character> {
    vec![
        Character::new("Thorin", "Fighter")
            .with_level(3)
            .with_hit_points(28)
            .with_abilities(AbilityScores::new(16, 14, 14, 10, 12, 8))
            .with_hit_dice(DieType::D10, 3),
        Character::new("Seren", "Cleric")
            .with_level(3)
            .with_hit_points(21)
            .with_abilities(AbilityScores::new(10, 12, 14, 10, 16, 11))
            .with_hit_dice(DieType::D8, 3)
            .with_spell(Spell::new("Bless", true))
            .with_spell(Spell::new("Cure Wounds", false)),
    ]
}

/// Starter quest log shown before anything has been saved.
pub fn sample_quests() -> Vec<Quest> {
    let mut quest = Quest::new(
        "The Missing Caravan",
        "Find out what happened to the supply caravan on the Greenest road.",
    );
    quest.add_event(QuestEvent::new(
        QuestEventKind::Discovery,
        "Wagon tracks leave the road two miles south of town.",
    ));
    vec![quest]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let store = Store::new(dir.path());

        let quests = sample_quests();
        store.save_quests(&quests).await.expect("save");

        let loaded = store.load_quests().await.expect("load");
        assert_eq!(loaded.len(), quests.len());
        assert_eq!(loaded[0].id, quests[0].id);
        assert_eq!(loaded[0].events.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_sample() {
        let dir = TempDir::new().expect("temp dir");
        let store = Store::new(dir.path().join("nothing_here"));

        let quests = store.load_quests().await.expect("load");
        assert!(!quests.is_empty());

        let inventory = store.load_inventory().await.expect("load");
        assert!(!inventory.is_empty());

        let characters = store.load_characters().await.expect("load");
        assert!(!characters.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_json_error() {
        let dir = TempDir::new().expect("temp dir");
        let store = Store::new(dir.path());

        tokio::fs::write(dir.path().join(format!("{QUESTS_KEY}.json")), "{not json")
            .await
            .expect("write");

        let result = store.load_quests().await;
        assert!(matches!(result, Err(PersistError::Json(_))));
    }

    #[tokio::test]
    async fn test_inventory_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let store = Store::new(dir.path());

        let mut inventory = Inventory::new();
        inventory.add(InventoryItem::new("Lantern", ItemKind::Tool).with_weight(2.0));
        store.save_inventory(&inventory).await.expect("save");

        let loaded = store.load_inventory().await.expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.items[0].name, "Lantern");
    }

    #[test]
    fn test_import_assigns_missing_ids() {
        let blob = r#"[
            {"name":"Torch","kind":"tool","description":"","weight":1.0,"qty":3,"equipped":false},
            {"id":"6dbb0846-d52a-4895-9df9-6d2e8a5714e0","name":"Bedroll","kind":"misc",
             "description":"","weight":7.0,"qty":1,"equipped":false}
        ]"#;

        let items: Vec<InventoryItem> = import_json(blob).expect("import");
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1].id.to_string(),
            "6dbb0846-d52a-4895-9df9-6d2e8a5714e0"
        );
        // The torch got a fresh id.
        assert_ne!(items[0].id, items[1].id);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let items = sample_inventory();
        let blob = export_json(&items).expect("export");
        let back: Vec<InventoryItem> = import_json(&blob).expect("import");
        assert_eq!(back.len(), items.len());
        assert_eq!(back[0].id, items[0].id);
        assert_eq!(back[0].name, items[0].name);
    }

    #[test]
    fn test_import_rejects_malformed_blob() {
        assert!(import_json::<InventoryItem>("not json at all").is_err());
    }
}
