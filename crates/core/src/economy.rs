use crate::{
    skill_by_id, Card, EconomyConfig, Event, EventBus, GameState, InventoryEntry, LevelUp,
    RandomSource, Rarity, RngState, SkillDef, SkillId, SkillSet,
};
use thiserror::Error;

/// Reasons an operation was refused. A declined operation leaves state untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Declined {
    #[error("pack count must be at least 1")]
    InvalidPackCount,
    #[error("not enough currency: need {cost}, have {currency}")]
    InsufficientFunds { cost: i64, currency: i64 },
    #[error("no cards selected")]
    EmptySelection,
    #[error("unknown skill: {0}")]
    UnknownSkill(String),
    #[error("skill already unlocked: {0}")]
    SkillAlreadyUnlocked(SkillId),
    #[error("not enough skill points: need {cost}, have {available}")]
    NotEnoughSkillPoints { cost: i64, available: i64 },
}

/// Weights indexed by `Rarity::index`.
pub type RarityWeights = [i64; 4];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityRoll {
    pub rarity: Rarity,
    /// Running value left when the rarity was chosen; `<= 0` on a normal pick.
    pub residual: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackOpening {
    pub packs: u32,
    pub cards: Vec<Card>,
    pub total_cost: i64,
    pub bonus_cards: usize,
    pub level_ups: Vec<LevelUp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleReceipt {
    pub total_value: i64,
    pub cards_sold: u64,
}

pub fn pack_cost(config: &EconomyConfig, skills: &SkillSet) -> i64 {
    let mut cost = config.pack_cost;
    if skills.has(SkillId::PackDiscount) {
        cost -= config.pack_discount;
    }
    cost.max(config.min_pack_cost)
}

pub fn cards_per_pack(config: &EconomyConfig, skills: &SkillSet) -> u32 {
    if skills.has(SkillId::MoreCards) {
        config.cards_per_pack_more
    } else {
        config.cards_per_pack
    }
}

pub fn max_affordable_packs(config: &EconomyConfig, skills: &SkillSet, currency: i64) -> u32 {
    let cost = pack_cost(config, skills);
    if cost <= 0 || currency <= 0 {
        return 0;
    }
    (currency / cost).min(i64::from(u32::MAX)) as u32
}

/// Base weights, shifted by a constant offset per rarity when `better_cards` is
/// unlocked. Shifted weights never go below zero.
pub fn rarity_weights(config: &EconomyConfig, skills: &SkillSet) -> RarityWeights {
    let boosted = skills.has(SkillId::BetterCards);
    let mut weights = [0; 4];
    for rarity in Rarity::ALL {
        let mut weight = config.base_weight(rarity);
        if boosted {
            weight += config.weight_offset(rarity);
        }
        weights[rarity.index()] = weight.max(0);
    }
    weights
}

/// Picks a rarity by walking `Rarity::ALL` and subtracting each weight from a
/// uniform roll in `[0, total)`. The first rarity that brings the roll to `<= 0`
/// wins, so a roll exactly on a boundary lands on the earlier rarity.
pub fn roll_rarity<S: RandomSource + ?Sized>(
    weights: &RarityWeights,
    source: &mut S,
) -> RarityRoll {
    let total: i64 = weights.iter().sum();
    let mut roll = source.next_unit() * total as f64;
    for rarity in Rarity::ALL {
        roll -= weights[rarity.index()] as f64;
        if roll <= 0.0 {
            return RarityRoll {
                rarity,
                residual: roll,
            };
        }
    }
    RarityRoll {
        rarity: Rarity::Common,
        residual: roll,
    }
}

pub fn card_xp(config: &EconomyConfig, skills: &SkillSet, rarity: Rarity) -> i64 {
    let xp = config.base_xp(rarity);
    if skills.has(SkillId::XpBoost) {
        (xp as f64 * config.xp_boost).floor() as i64
    } else {
        xp
    }
}

pub fn draw_card<S: RandomSource + ?Sized>(
    config: &EconomyConfig,
    skills: &SkillSet,
    source: &mut S,
) -> Card {
    let weights = rarity_weights(config, skills);
    let rarity = roll_rarity(&weights, source).rarity;
    let names = rarity.names();
    let name = names[source.pick_index(names.len())];
    Card {
        name: name.to_string(),
        rarity,
        xp: card_xp(config, skills, rarity),
        value: config.base_value(rarity),
    }
}

/// Per-card sell price after the `increased_value` markup.
pub fn sell_value(config: &EconomyConfig, skills: &SkillSet, entry: &InventoryEntry) -> i64 {
    if skills.has(SkillId::IncreasedValue) {
        (entry.value as f64 * config.sell_markup).floor() as i64
    } else {
        entry.value
    }
}

pub fn stack_value(config: &EconomyConfig, skills: &SkillSet, entry: &InventoryEntry) -> i64 {
    sell_value(config, skills, entry) * i64::from(entry.count)
}

/// Config, randomness and game state bundled for the front ends.
#[derive(Debug, Clone)]
pub struct Session<R = RngState> {
    pub config: EconomyConfig,
    pub rng: R,
    pub state: GameState,
}

impl<R: RandomSource> Session<R> {
    pub fn new(config: EconomyConfig, rng: R) -> Self {
        let state = GameState::new(&config);
        Self { config, rng, state }
    }

    pub fn with_state(config: EconomyConfig, rng: R, state: GameState) -> Self {
        Self { config, rng, state }
    }

    pub fn pack_cost(&self) -> i64 {
        pack_cost(&self.config, &self.state.skills)
    }

    pub fn cards_per_pack(&self) -> u32 {
        cards_per_pack(&self.config, &self.state.skills)
    }

    pub fn max_affordable_packs(&self) -> u32 {
        max_affordable_packs(
            &self.config,
            &self.state.skills,
            self.state.progress.currency,
        )
    }

    pub fn xp_needed(&self) -> i64 {
        self.state.progress.xp_needed(&self.config)
    }

    pub fn draw_card(&mut self) -> Card {
        draw_card(&self.config, &self.state.skills, &mut self.rng)
    }

    pub fn sell_value(&self, entry: &InventoryEntry) -> i64 {
        sell_value(&self.config, &self.state.skills, entry)
    }

    /// Sell value of every stack currently held.
    pub fn inventory_value(&self) -> i64 {
        self.state
            .inventory
            .iter()
            .map(|(_, entry)| stack_value(&self.config, &self.state.skills, entry))
            .sum()
    }

    /// Buys `count` packs at once. Funds are checked for the whole batch before
    /// anything is spent; once paid, card generation cannot fail.
    pub fn open_packs(
        &mut self,
        count: u32,
        events: &mut EventBus,
    ) -> Result<PackOpening, Declined> {
        if count == 0 {
            return Err(Declined::InvalidPackCount);
        }
        let total_cost = self.pack_cost().saturating_mul(i64::from(count));
        let currency = self.state.progress.currency;
        if currency < total_cost {
            tracing::debug!(count, total_cost, currency, "pack purchase declined");
            return Err(Declined::InsufficientFunds {
                cost: total_cost,
                currency,
            });
        }
        self.state.progress.currency -= total_cost;

        let per_pack = self.cards_per_pack();
        let lucky = self.state.skills.has(SkillId::LuckyPacks);
        let capacity = (count as usize).saturating_mul(per_pack as usize + 1);
        let mut pulls: Vec<(Card, bool)> = Vec::with_capacity(capacity.min(4096));
        for _ in 0..count {
            for _ in 0..per_pack {
                pulls.push((self.draw_card(), false));
            }
            if lucky && self.rng.chance(self.config.lucky_bonus_chance) {
                pulls.push((self.draw_card(), true));
            }
        }

        events.push(Event::PacksOpened {
            packs: count,
            cost: total_cost,
            cards: pulls.len(),
            currency: self.state.progress.currency,
        });

        let mut level_ups = Vec::new();
        let mut bonus_cards = 0;
        for (card, bonus) in &pulls {
            self.merge_into_inventory(card);
            *self.state.stats.pulls.entry(card.rarity).or_insert(0) += 1;
            if *bonus {
                bonus_cards += 1;
            }
            events.push(Event::CardDrawn {
                name: card.name.clone(),
                rarity: card.rarity,
                xp: card.xp,
                bonus: *bonus,
            });
            level_ups.extend(self.apply_xp(card.xp, events));
        }

        let stats = &mut self.state.stats;
        stats.packs_opened += u64::from(count);
        stats.cards_opened += pulls.len() as u64;
        stats.bonus_cards += bonus_cards as u64;
        stats.currency_spent += total_cost;

        tracing::debug!(
            count,
            total_cost,
            cards = pulls.len(),
            bonus_cards,
            "packs opened"
        );
        Ok(PackOpening {
            packs: count,
            cards: pulls.into_iter().map(|(card, _)| card).collect(),
            total_cost,
            bonus_cards,
            level_ups,
        })
    }

    pub fn merge_into_inventory(&mut self, card: &Card) {
        self.state.inventory.merge(card);
    }

    pub fn apply_xp(&mut self, amount: i64, events: &mut EventBus) -> Vec<LevelUp> {
        let level_ups = self.state.progress.apply_xp(&self.config, amount);
        for up in &level_ups {
            tracing::info!(level = up.level, skill_points = up.skill_points, "level up");
            events.push(Event::LeveledUp {
                level: up.level,
                skill_points: up.skill_points,
            });
        }
        level_ups
    }

    /// Sells every listed stack in full. Keys not in the inventory are skipped;
    /// only an empty key list is refused.
    pub fn sell_entries<I, S>(
        &mut self,
        keys: I,
        events: &mut EventBus,
    ) -> Result<SaleReceipt, Declined>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|key| key.as_ref().to_string()).collect();
        if keys.is_empty() {
            return Err(Declined::EmptySelection);
        }

        let mut receipt = SaleReceipt {
            total_value: 0,
            cards_sold: 0,
        };
        for key in &keys {
            let Some(entry) = self.state.inventory.take(key) else {
                continue;
            };
            receipt.total_value += stack_value(&self.config, &self.state.skills, &entry);
            receipt.cards_sold += u64::from(entry.count);
        }

        let progress = &mut self.state.progress;
        progress.currency = progress.currency.saturating_add(receipt.total_value);
        self.state.stats.cards_sold += receipt.cards_sold;
        self.state.stats.currency_earned += receipt.total_value;
        for key in &keys {
            self.state.selection.remove(key);
        }
        self.state.prune_selection();

        events.push(Event::CardsSold {
            cards: receipt.cards_sold,
            value: receipt.total_value,
            currency: self.state.progress.currency,
        });
        tracing::debug!(
            requested = keys.len(),
            cards = receipt.cards_sold,
            value = receipt.total_value,
            "cards sold"
        );
        Ok(receipt)
    }

    pub fn sell_selected(&mut self, events: &mut EventBus) -> Result<SaleReceipt, Declined> {
        let keys: Vec<String> = self.state.selection.iter().cloned().collect();
        self.sell_entries(keys, events)
    }

    pub fn unlock_skill(
        &mut self,
        id: &str,
        events: &mut EventBus,
    ) -> Result<&'static SkillDef, Declined> {
        let def = skill_by_id(id).ok_or_else(|| Declined::UnknownSkill(id.to_string()))?;
        if self.state.skills.has(def.id) {
            return Err(Declined::SkillAlreadyUnlocked(def.id));
        }
        let available = self.state.progress.skill_points;
        if available < def.cost {
            return Err(Declined::NotEnoughSkillPoints {
                cost: def.cost,
                available,
            });
        }
        self.state.progress.skill_points -= def.cost;
        self.state.skills.unlock(def.id);
        self.state.stats.skills_unlocked += 1;
        events.push(Event::SkillUnlocked {
            id: def.id,
            cost: def.cost,
            skill_points: self.state.progress.skill_points,
        });
        tracing::info!(skill = %def.id, cost = def.cost, "skill unlocked");
        Ok(def)
    }
}
