use crate::{EconomyConfig, Inventory, PlayerProgress, Rarity, SkillSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub packs_opened: u64,
    pub cards_opened: u64,
    pub bonus_cards: u64,
    pub cards_sold: u64,
    pub currency_spent: i64,
    pub currency_earned: i64,
    pub skills_unlocked: u64,
    pub pulls: BTreeMap<Rarity, u64>,
}

impl Stats {
    pub fn pulls_of(&self, rarity: Rarity) -> u64 {
        self.pulls.get(&rarity).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub progress: PlayerProgress,
    pub inventory: Inventory,
    pub skills: SkillSet,
    pub stats: Stats,
    /// Keys picked for the next sale. Kept in memory only.
    pub selection: BTreeSet<String>,
}

impl GameState {
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            progress: PlayerProgress::new(config.starting_currency),
            inventory: Inventory::new(),
            skills: SkillSet::new(),
            stats: Stats::default(),
            selection: BTreeSet::new(),
        }
    }

    /// Adds the key if it names a stack, removes it if already selected.
    /// Returns whether the key is selected afterwards.
    pub fn toggle_selection(&mut self, key: &str) -> bool {
        if self.selection.remove(key) {
            return false;
        }
        if !self.inventory.contains(key) {
            return false;
        }
        self.selection.insert(key.to_string());
        true
    }

    pub fn select_all(&mut self) {
        self.selection = self.inventory.keys().cloned().collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn prune_selection(&mut self) {
        let inventory = &self.inventory;
        self.selection.retain(|key| inventory.contains(key));
    }
}
