use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Draw order. The weighted roll walks rarities in exactly this order.
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub fn index(self) -> usize {
        match self {
            Rarity::Common => 0,
            Rarity::Rare => 1,
            Rarity::Epic => 2,
            Rarity::Legendary => 3,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rarity| rarity.id() == id)
    }

    /// Inventory display rank: legendary first, common last.
    pub fn display_rank(self) -> u8 {
        match self {
            Rarity::Legendary => 0,
            Rarity::Epic => 1,
            Rarity::Rare => 2,
            Rarity::Common => 3,
        }
    }

    pub fn names(self) -> &'static [&'static str] {
        match self {
            Rarity::Common => COMMON_NAMES,
            Rarity::Rare => RARE_NAMES,
            Rarity::Epic => EPIC_NAMES,
            Rarity::Legendary => LEGENDARY_NAMES,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

const COMMON_NAMES: &[&str] = &[
    "Stone Guardian",
    "Wooden Shield",
    "Iron Dagger",
    "Copper Coin",
    "Cloth Armor",
    "Basic Sword",
    "Simple Bow",
    "Leather Boots",
    "Bronze Helm",
    "Training Staff",
];

const RARE_NAMES: &[&str] = &[
    "Silver Blade",
    "Emerald Ring",
    "Steel Armor",
    "Crystal Wand",
    "Ruby Amulet",
    "Sapphire Shield",
    "Golden Arrow",
    "Mystic Robe",
    "Diamond Dagger",
    "Platinum Crown",
];

const EPIC_NAMES: &[&str] = &[
    "Dragon Scale",
    "Phoenix Feather",
    "Titan Hammer",
    "Void Crystal",
    "Storm Blade",
    "Celestial Bow",
    "Infernal Axe",
    "Arcane Orb",
    "Thunder Staff",
    "Shadow Cloak",
];

const LEGENDARY_NAMES: &[&str] = &[
    "Excalibur",
    "Mjolnir",
    "Aegis Shield",
    "Infinity Gauntlet",
    "Death Scythe",
    "Holy Grail",
    "Eternal Flame",
    "Cosmic Crown",
    "Sword of Legends",
    "Godslayer",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub name: String,
    pub rarity: Rarity,
    pub xp: i64,
    pub value: i64,
}

impl Card {
    /// Inventory key; identical name and rarity collapse into one stack.
    pub fn key(&self) -> String {
        card_key(&self.name, self.rarity)
    }
}

pub fn card_key(name: &str, rarity: Rarity) -> String {
    format!("{name}_{}", rarity.id())
}
