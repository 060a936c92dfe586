use crate::Rarity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RarityRule {
    pub rarity: Rarity,
    pub xp: i64,
    pub value: i64,
    pub weight: i64,
}

/// Constant weight shift applied by the `better_cards` skill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightOffset {
    pub rarity: Rarity,
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_currency: i64,
    pub pack_cost: i64,
    pub pack_discount: i64,
    pub min_pack_cost: i64,
    pub cards_per_pack: u32,
    pub cards_per_pack_more: u32,
    pub lucky_bonus_chance: f64,
    pub xp_boost: f64,
    pub sell_markup: f64,
    pub base_xp_requirement: i64,
    pub level_growth: f64,
    pub rarities: Vec<RarityRule>,
    pub better_cards_offsets: Vec<WeightOffset>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_currency: 100,
            pack_cost: 50,
            pack_discount: 10,
            min_pack_cost: 10,
            cards_per_pack: 5,
            cards_per_pack_more: 7,
            lucky_bonus_chance: 0.2,
            xp_boost: 1.25,
            sell_markup: 1.5,
            base_xp_requirement: 100,
            level_growth: 1.5,
            rarities: vec![
                RarityRule {
                    rarity: Rarity::Common,
                    xp: 10,
                    value: 5,
                    weight: 50,
                },
                RarityRule {
                    rarity: Rarity::Rare,
                    xp: 25,
                    value: 15,
                    weight: 30,
                },
                RarityRule {
                    rarity: Rarity::Epic,
                    xp: 50,
                    value: 35,
                    weight: 15,
                },
                RarityRule {
                    rarity: Rarity::Legendary,
                    xp: 100,
                    value: 75,
                    weight: 5,
                },
            ],
            better_cards_offsets: vec![
                WeightOffset {
                    rarity: Rarity::Common,
                    delta: -10,
                },
                WeightOffset {
                    rarity: Rarity::Rare,
                    delta: 5,
                },
                WeightOffset {
                    rarity: Rarity::Epic,
                    delta: 3,
                },
                WeightOffset {
                    rarity: Rarity::Legendary,
                    delta: 2,
                },
            ],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing rarity rule for {0}")]
    MissingRarity(Rarity),
    #[error("negative value for {0}")]
    Negative(&'static str),
    #[error("invalid multiplier {name}: {value}")]
    InvalidMultiplier { name: &'static str, value: f64 },
    #[error("packs must contain at least one card")]
    EmptyPack,
    #[error("rarity weights sum to zero")]
    ZeroWeights,
}

impl EconomyConfig {
    pub fn rarity_rule(&self, rarity: Rarity) -> Option<&RarityRule> {
        self.rarities.iter().find(|rule| rule.rarity == rarity)
    }

    pub fn base_xp(&self, rarity: Rarity) -> i64 {
        self.rarity_rule(rarity).map_or(0, |rule| rule.xp)
    }

    pub fn base_value(&self, rarity: Rarity) -> i64 {
        self.rarity_rule(rarity).map_or(0, |rule| rule.value)
    }

    pub fn base_weight(&self, rarity: Rarity) -> i64 {
        self.rarity_rule(rarity).map_or(0, |rule| rule.weight)
    }

    pub fn weight_offset(&self, rarity: Rarity) -> i64 {
        self.better_cards_offsets
            .iter()
            .filter(|offset| offset.rarity == rarity)
            .map(|offset| offset.delta)
            .sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for rarity in Rarity::ALL {
            let rule = self
                .rarity_rule(rarity)
                .ok_or(ConfigError::MissingRarity(rarity))?;
            if rule.xp < 0 || rule.value < 0 || rule.weight < 0 {
                return Err(ConfigError::Negative("rarity rule"));
            }
        }
        if Rarity::ALL.iter().map(|r| self.base_weight(*r)).sum::<i64>() <= 0 {
            return Err(ConfigError::ZeroWeights);
        }
        let non_negative = [
            ("starting_currency", self.starting_currency),
            ("pack_cost", self.pack_cost),
            ("pack_discount", self.pack_discount),
            ("min_pack_cost", self.min_pack_cost),
        ];
        for (name, value) in non_negative {
            if value < 0 {
                return Err(ConfigError::Negative(name));
            }
        }
        if self.base_xp_requirement <= 0 {
            return Err(ConfigError::Negative("base_xp_requirement"));
        }
        if self.cards_per_pack == 0 || self.cards_per_pack_more == 0 {
            return Err(ConfigError::EmptyPack);
        }
        let multipliers = [
            ("xp_boost", self.xp_boost, 0.0),
            ("sell_markup", self.sell_markup, 0.0),
            ("level_growth", self.level_growth, 1.0),
        ];
        for (name, value, min) in multipliers {
            if !value.is_finite() || value < min {
                return Err(ConfigError::InvalidMultiplier { name, value });
            }
        }
        // A flat curve turns one large xp gain into one loop pass per level.
        if self.level_growth <= 1.0 {
            return Err(ConfigError::InvalidMultiplier {
                name: "level_growth",
                value: self.level_growth,
            });
        }
        if !(0.0..=1.0).contains(&self.lucky_bonus_chance) {
            return Err(ConfigError::InvalidMultiplier {
                name: "lucky_bonus_chance",
                value: self.lucky_bonus_chance,
            });
        }
        Ok(())
    }
}
