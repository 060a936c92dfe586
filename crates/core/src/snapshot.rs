use crate::{
    EconomyConfig, GameState, Inventory, InventoryEntry, PlayerProgress, SkillId, SkillSet, Stats,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_CURRENCY: i64 = 100;

/// Persisted form of a [`GameState`]. Field names follow the browser save
/// layout (`skillPoints`, `inventory`, ...). Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub currency: i64,
    pub xp: i64,
    pub level: u32,
    pub skill_points: i64,
    pub inventory: BTreeMap<String, InventoryEntry>,
    pub skills: BTreeMap<String, bool>,
    pub stats: Stats,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY,
            xp: 0,
            level: 1,
            skill_points: 0,
            inventory: BTreeMap::new(),
            skills: BTreeMap::new(),
            stats: Stats::default(),
        }
    }
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let progress = state.progress;
        Self {
            currency: progress.currency,
            xp: progress.xp,
            level: progress.level,
            skill_points: progress.skill_points,
            inventory: state
                .inventory
                .iter()
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect(),
            skills: state
                .skills
                .iter()
                .map(|id| (id.as_str().to_string(), true))
                .collect(),
            stats: state.stats.clone(),
        }
    }

    /// Rebuilds a state, repairing anything a hand-edited or older save may
    /// carry: negative counters, level 0, empty stacks, unknown skill ids and
    /// xp past the current level's requirement.
    pub fn restore(self, config: &EconomyConfig) -> GameState {
        let mut progress = PlayerProgress {
            currency: self.currency.max(0),
            xp: self.xp.max(0),
            level: self.level.max(1),
            skill_points: self.skill_points.max(0),
        };
        let gained = progress.apply_xp(config, 0);
        if !gained.is_empty() {
            tracing::debug!(levels = gained.len(), "normalized stored xp");
        }

        let mut inventory = Inventory::new();
        for entry in self.inventory.into_values() {
            inventory.insert_entry(entry);
        }

        let skills = SkillSet::with(
            self.skills
                .iter()
                .filter(|(_, unlocked)| **unlocked)
                .filter_map(|(id, _)| SkillId::parse(id)),
        );

        GameState {
            progress,
            inventory,
            skills,
            stats: self.stats,
            selection: BTreeSet::new(),
        }
    }
}
