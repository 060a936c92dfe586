use crate::EconomyConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerProgress {
    pub currency: i64,
    pub xp: i64,
    pub level: u32,
    pub skill_points: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
    pub skill_points: i64,
}

impl PlayerProgress {
    pub fn new(starting_currency: i64) -> Self {
        Self {
            currency: starting_currency,
            xp: 0,
            level: 1,
            skill_points: 0,
        }
    }

    pub fn xp_needed(&self, config: &EconomyConfig) -> i64 {
        xp_requirement(config, self.level)
    }

    /// Adds xp and levels up until the remainder is below the next requirement.
    /// Each crossed level is reported separately and grants one skill point.
    pub fn apply_xp(&mut self, config: &EconomyConfig, amount: i64) -> Vec<LevelUp> {
        self.xp = self.xp.saturating_add(amount.max(0));
        let mut level_ups = Vec::new();
        let mut required = xp_requirement(config, self.level);
        while self.xp >= required && self.level < u32::MAX && required < i64::MAX {
            self.xp -= required;
            self.level += 1;
            self.skill_points = self.skill_points.saturating_add(1);
            required = xp_requirement(config, self.level);
            level_ups.push(LevelUp {
                level: self.level,
                skill_points: self.skill_points,
            });
        }
        // The curve tops out at the numeric limits; park xp just under the cap.
        if self.xp >= required {
            self.xp = required - 1;
        }
        level_ups
    }
}

/// `floor(base * growth^(level - 1))`, at least 1.
pub fn xp_requirement(config: &EconomyConfig, level: u32) -> i64 {
    let exponent = level.saturating_sub(1).min(i32::MAX as u32) as i32;
    let raw = config.base_xp_requirement as f64 * config.level_growth.powi(exponent);
    (raw.floor() as i64).max(1)
}
