use crate::{Rarity, SkillId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    PacksOpened {
        packs: u32,
        cost: i64,
        cards: usize,
        currency: i64,
    },
    CardDrawn {
        name: String,
        rarity: Rarity,
        xp: i64,
        bonus: bool,
    },
    LeveledUp {
        level: u32,
        skill_points: i64,
    },
    CardsSold {
        cards: u64,
        value: i64,
        currency: i64,
    },
    SkillUnlocked {
        id: SkillId,
        cost: i64,
        skill_points: i64,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
