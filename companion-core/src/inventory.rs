//! Party inventory.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Item categories. Anything a save file calls something else lands in
/// `Misc` rather than failing the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Weapon,
    Armor,
    Consumable,
    Tool,
    #[default]
    #[serde(other)]
    Misc,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "Weapon",
            ItemKind::Armor => "Armor",
            ItemKind::Consumable => "Consumable",
            ItemKind::Tool => "Tool",
            ItemKind::Misc => "Misc",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One inventory row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub kind: ItemKind,
    pub description: String,
    /// Weight per unit, in pounds.
    pub weight: f32,
    pub qty: u32,
    pub equipped: bool,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            description: String::new(),
            weight: 0.0,
            qty: 1,
            equipped: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_qty(mut self, qty: u32) -> Self {
        self.qty = qty;
        self
    }
}

/// The party's item list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: InventoryItem) {
        self.items.push(item);
    }

    /// Remove an item by id, returning it if present.
    pub fn remove(&mut self, id: Uuid) -> Option<InventoryItem> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut InventoryItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn find(&self, name: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Flip the equipped flag. Returns false if the item is unknown.
    pub fn set_equipped(&mut self, id: Uuid, equipped: bool) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.equipped = equipped;
                true
            }
            None => false,
        }
    }

    pub fn total_weight(&self) -> f32 {
        self.items.iter().map(|i| i.weight * i.qty as f32).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crud() {
        let mut inv = Inventory::new();
        let sword = InventoryItem::new("Longsword", ItemKind::Weapon).with_weight(3.0);
        let id = sword.id;
        inv.add(sword);

        assert_eq!(inv.len(), 1);
        assert!(inv.find("Longsword").is_some());

        inv.get_mut(id).unwrap().qty = 2;
        assert_eq!(inv.get(id).unwrap().qty, 2);

        let removed = inv.remove(id).unwrap();
        assert_eq!(removed.name, "Longsword");
        assert!(inv.is_empty());
        assert!(inv.remove(id).is_none());
    }

    #[test]
    fn test_equipped_toggle() {
        let mut inv = Inventory::new();
        let shield = InventoryItem::new("Shield", ItemKind::Armor);
        let id = shield.id;
        inv.add(shield);

        assert!(inv.set_equipped(id, true));
        assert!(inv.get(id).unwrap().equipped);
        assert!(!inv.set_equipped(Uuid::new_v4(), true));
    }

    #[test]
    fn test_total_weight() {
        let mut inv = Inventory::new();
        inv.add(
            InventoryItem::new("Rations", ItemKind::Consumable)
                .with_weight(2.0)
                .with_qty(5),
        );
        inv.add(InventoryItem::new("Rope", ItemKind::Tool).with_weight(10.0));
        assert!((inv.total_weight() - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_kind_deserializes_to_misc() {
        let json = r#"{"id":"6dbb0846-d52a-4895-9df9-6d2e8a5714e0","name":"Odd Trinket",
                       "kind":"curiosity","description":"","weight":0.1,"qty":1,"equipped":false}"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ItemKind::Misc);
    }
}
