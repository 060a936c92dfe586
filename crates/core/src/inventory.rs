use crate::{card_key, Card, Rarity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryEntry {
    pub name: String,
    pub rarity: Rarity,
    pub xp: i64,
    pub value: i64,
    pub count: u32,
}

impl InventoryEntry {
    pub fn key(&self) -> String {
        card_key(&self.name, self.rarity)
    }
}

/// Card stacks keyed by `name_rarity`. A stored stack always has `count >= 1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inventory {
    entries: BTreeMap<String, InventoryEntry>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one card, stacking onto an existing entry with the same key.
    pub fn merge(&mut self, card: &Card) {
        let key = card.key();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.count = entry.count.saturating_add(1);
            return;
        }
        self.entries.insert(
            key,
            InventoryEntry {
                name: card.name.clone(),
                rarity: card.rarity,
                xp: card.xp,
                value: card.value,
                count: 1,
            },
        );
    }

    /// Inserts a restored entry under its canonical key. Empty stacks are dropped.
    pub fn insert_entry(&mut self, entry: InventoryEntry) {
        if entry.count == 0 {
            return;
        }
        match self.entries.get_mut(&entry.key()) {
            Some(existing) => existing.count = existing.count.saturating_add(entry.count),
            None => {
                self.entries.insert(entry.key(), entry);
            }
        }
    }

    /// Removes a whole stack.
    pub fn take(&mut self, key: &str) -> Option<InventoryEntry> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&InventoryEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InventoryEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_cards(&self) -> u64 {
        self.entries.values().map(|entry| u64::from(entry.count)).sum()
    }

    /// Entries in display order: legendary first, then by name.
    pub fn sorted(&self) -> Vec<(&String, &InventoryEntry)> {
        let mut rows: Vec<_> = self.entries.iter().collect();
        rows.sort_by(|(_, a), (_, b)| {
            a.rarity
                .display_rank()
                .cmp(&b.rarity.display_rank())
                .then_with(|| a.name.cmp(&b.name))
        });
        rows
    }
}
