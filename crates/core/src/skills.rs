use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    PackDiscount,
    BetterCards,
    MoreCards,
    IncreasedValue,
    XpBoost,
    LuckyPacks,
}

impl SkillId {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillId::PackDiscount => "pack_discount",
            SkillId::BetterCards => "better_cards",
            SkillId::MoreCards => "more_cards",
            SkillId::IncreasedValue => "increased_value",
            SkillId::XpBoost => "xp_boost",
            SkillId::LuckyPacks => "lucky_packs",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        SKILLS
            .iter()
            .map(|skill| skill.id)
            .find(|skill| skill.as_str() == id)
    }

    pub fn def(self) -> &'static SkillDef {
        // Every variant has exactly one row in SKILLS.
        SKILLS
            .iter()
            .find(|skill| skill.id == self)
            .unwrap_or(&SKILLS[0])
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillDef {
    pub id: SkillId,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: i64,
}

const SKILLS: &[SkillDef] = &[
    SkillDef {
        id: SkillId::PackDiscount,
        name: "Pack Discount",
        description: "Reduce pack cost by 10 currency",
        cost: 1,
    },
    SkillDef {
        id: SkillId::BetterCards,
        name: "Better Cards",
        description: "Increase chance of getting rare and above cards",
        cost: 2,
    },
    SkillDef {
        id: SkillId::MoreCards,
        name: "More Cards Per Pack",
        description: "Get 7 cards per pack instead of 5",
        cost: 2,
    },
    SkillDef {
        id: SkillId::IncreasedValue,
        name: "Increased Card Value",
        description: "Cards sell for 50% more currency",
        cost: 3,
    },
    SkillDef {
        id: SkillId::XpBoost,
        name: "XP Boost",
        description: "Gain 25% more XP from cards",
        cost: 2,
    },
    SkillDef {
        id: SkillId::LuckyPacks,
        name: "Lucky Packs",
        description: "Small chance to get bonus cards in packs",
        cost: 3,
    },
];

pub fn all_skills() -> &'static [SkillDef] {
    SKILLS
}

pub fn skill_by_id(id: &str) -> Option<&'static SkillDef> {
    SKILLS.iter().find(|skill| skill.id.as_str() == id)
}

/// Unlocked perks. Flat: no skill depends on another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    unlocked: BTreeSet<SkillId>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(skills: impl IntoIterator<Item = SkillId>) -> Self {
        Self {
            unlocked: skills.into_iter().collect(),
        }
    }

    pub fn has(&self, id: SkillId) -> bool {
        self.unlocked.contains(&id)
    }

    /// Returns false when the skill was already unlocked.
    pub fn unlock(&mut self, id: SkillId) -> bool {
        self.unlocked.insert(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = SkillId> + '_ {
        self.unlocked.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }
}
