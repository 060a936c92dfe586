use anyhow::{Context, Result};
use packclick_core::{
    all_skills, stack_value, Card, Declined, Event, EventBus, InventoryEntry, RngState, Session,
    SkillDef,
};
use packclick_data::{load_economy_config, load_game, save_game};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const MAX_EVENT_LOG: usize = 200;
pub const LAST_PULL_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Inventory,
    Skills,
    Events,
}

#[derive(Debug, Clone)]
pub struct InventoryRow {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct SkillRow {
    pub def: &'static SkillDef,
    pub unlocked: bool,
    pub label: String,
}

pub struct App {
    pub session: Session,
    pub events: EventBus,
    pub save_path: Option<PathBuf>,
    pub focus: FocusPane,
    pub inventory_cursor: usize,
    pub skill_cursor: usize,
    pub last_pull: Vec<Card>,
    pub last_pull_at: Option<Instant>,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn bootstrap(
        assets_dir: &Path,
        save_path: Option<PathBuf>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let config = load_economy_config(assets_dir).context("load economy config")?;
        let state = match save_path.as_deref() {
            Some(path) => load_game(path, &config),
            None => packclick_core::GameState::new(&config),
        };
        let rng = seed.map(RngState::from_seed).unwrap_or_else(RngState::from_entropy);
        let seed = rng.seed();
        let mut app = Self::new(Session::with_state(config, rng, state), save_path);
        match app.save_path.as_deref() {
            Some(path) => app.push_event_line(format!("save file: {}", path.display())),
            None => app.push_event_line("no save path; progress is not kept".to_string()),
        }
        app.push_event_line(format!("seed: {seed}"));
        tracing::info!(seed, "cui session started");
        Ok(app)
    }

    pub fn new(session: Session, save_path: Option<PathBuf>) -> Self {
        Self {
            session,
            events: EventBus::default(),
            save_path,
            focus: FocusPane::Inventory,
            inventory_cursor: 0,
            skill_cursor: 0,
            last_pull: Vec::new(),
            last_pull_at: None,
            event_log: VecDeque::new(),
            status_line: "ready".to_string(),
            show_help: false,
            should_quit: false,
        }
    }

    pub fn on_tick(&mut self) {
        self.expire_last_pull(Instant::now());
    }

    pub fn expire_last_pull(&mut self, now: Instant) {
        let Some(at) = self.last_pull_at else {
            return;
        };
        if now.saturating_duration_since(at) >= LAST_PULL_TTL {
            self.last_pull.clear();
            self.last_pull_at = None;
        }
    }

    pub fn focus_label(&self, pane: FocusPane) -> &'static str {
        match pane {
            FocusPane::Inventory => "Inventory",
            FocusPane::Skills => "Skills",
            FocusPane::Events => "Events",
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        self.focus = match (self.focus, forward) {
            (FocusPane::Inventory, true) => FocusPane::Skills,
            (FocusPane::Skills, true) => FocusPane::Events,
            (FocusPane::Events, true) => FocusPane::Inventory,
            (FocusPane::Inventory, false) => FocusPane::Events,
            (FocusPane::Skills, false) => FocusPane::Inventory,
            (FocusPane::Events, false) => FocusPane::Skills,
        };
    }

    pub fn move_cursor(&mut self, down: bool) {
        match self.focus {
            FocusPane::Inventory => {
                let len = self.session.state.inventory.len();
                move_index(&mut self.inventory_cursor, len, down);
            }
            FocusPane::Skills => {
                let len = all_skills().len();
                move_index(&mut self.skill_cursor, len, down);
            }
            FocusPane::Events => {}
        }
    }

    pub fn toggle_focused_selection(&mut self) {
        if self.focus != FocusPane::Inventory {
            return;
        }
        let Some(key) = self.focused_inventory_key() else {
            return;
        };
        self.session.state.toggle_selection(&key);
    }

    pub fn select_all(&mut self) {
        self.session.state.select_all();
        self.push_status(format!(
            "selected {} stacks",
            self.session.state.selection.len()
        ));
    }

    pub fn clear_selection(&mut self) {
        self.session.state.clear_selection();
        self.push_status("selection cleared");
    }

    pub fn activate_primary(&mut self) {
        match self.focus {
            FocusPane::Inventory => self.toggle_focused_selection(),
            FocusPane::Skills => self.unlock_focused_skill(),
            FocusPane::Events => {}
        }
    }

    pub fn open_packs(&mut self, count: u32) {
        match self.session.open_packs(count, &mut self.events) {
            Ok(opening) => {
                let mut status = format!(
                    "opened {} pack(s) for {}: {} cards",
                    opening.packs,
                    opening.total_cost,
                    opening.cards.len()
                );
                if opening.bonus_cards > 0 {
                    status.push_str(&format!(", {} lucky bonus", opening.bonus_cards));
                }
                if let Some(up) = opening.level_ups.last() {
                    status.push_str(&format!(", reached level {}", up.level));
                }
                self.last_pull = opening.cards;
                self.last_pull_at = Some(Instant::now());
                self.push_status(status);
                self.persist();
            }
            Err(err) => self.push_decline(err),
        }
        self.flush_events();
        self.normalize_cursors();
    }

    /// Opens as many packs as the current balance covers. With nothing
    /// affordable a single pack is attempted so the decline is reported.
    pub fn open_max_packs(&mut self) {
        let count = self.session.max_affordable_packs().max(1);
        self.open_packs(count);
    }

    pub fn sell_selected(&mut self) {
        match self.session.sell_selected(&mut self.events) {
            Ok(receipt) => {
                self.push_status(format!(
                    "sold {} cards for {}",
                    receipt.cards_sold, receipt.total_value
                ));
                self.persist();
            }
            Err(err) => self.push_decline(err),
        }
        self.flush_events();
        self.normalize_cursors();
    }

    pub fn unlock_focused_skill(&mut self) {
        let Some(def) = all_skills().get(self.skill_cursor) else {
            return;
        };
        match self.session.unlock_skill(def.id.as_str(), &mut self.events) {
            Ok(def) => {
                self.push_status(format!("unlocked {}", def.name));
                self.persist();
            }
            Err(err) => self.push_decline(err),
        }
        self.flush_events();
    }

    pub fn inventory_rows(&self) -> Vec<InventoryRow> {
        self.session
            .state
            .inventory
            .sorted()
            .into_iter()
            .map(|(key, entry)| InventoryRow {
                key: key.clone(),
                label: self.inventory_label(key, entry),
            })
            .collect()
    }

    pub fn skill_rows(&self) -> Vec<SkillRow> {
        all_skills()
            .iter()
            .map(|def| {
                let unlocked = self.session.state.skills.has(def.id);
                let marker = if unlocked { "[x]" } else { "[ ]" };
                SkillRow {
                    def,
                    unlocked,
                    label: format!(
                        "{marker} {} ({} pt) - {}",
                        def.name, def.cost, def.description
                    ),
                }
            })
            .collect()
    }

    pub fn focused_inventory_key(&self) -> Option<String> {
        let sorted = self.session.state.inventory.sorted();
        let len = sorted.len();
        if len == 0 {
            return None;
        }
        sorted
            .get(self.inventory_cursor.min(len - 1))
            .map(|(key, _)| (*key).clone())
    }

    pub fn selection_value(&self) -> i64 {
        let state = &self.session.state;
        state
            .selection
            .iter()
            .filter_map(|key| state.inventory.get(key))
            .map(|entry| stack_value(&self.session.config, &state.skills, entry))
            .sum()
    }

    pub fn normalize_cursors(&mut self) {
        let inventory_len = self.session.state.inventory.len();
        clamp_index(&mut self.inventory_cursor, inventory_len);
        clamp_index(&mut self.skill_cursor, all_skills().len());
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    pub fn push_decline(&mut self, err: Declined) {
        self.status_line = format!("declined: {err}");
    }

    fn inventory_label(&self, key: &str, entry: &InventoryEntry) -> String {
        let marker = if self.session.state.selection.contains(key) {
            "*"
        } else {
            " "
        };
        format!(
            "{marker} {} ({}) x{}  sells {}",
            entry.name,
            entry.rarity,
            entry.count,
            self.session.sell_value(entry)
        )
    }

    fn persist(&mut self) {
        let Some(path) = self.save_path.as_deref() else {
            return;
        };
        if let Err(err) = save_game(&self.session.state, path) {
            tracing::warn!(path = %path.display(), "{err:#}");
            self.status_line = format!("save failed: {err:#}");
        }
    }

    fn flush_events(&mut self) {
        let drained: Vec<_> = self.events.drain().collect();
        for event in drained {
            self.push_event_line(format_event(&event));
        }
    }

    fn push_event_line(&mut self, line: String) {
        if self.event_log.len() >= MAX_EVENT_LOG {
            let _ = self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }
}

fn move_index(value: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *value = 0;
        return;
    }
    if down {
        *value = (*value + 1) % len;
    } else if *value == 0 {
        *value = len - 1;
    } else {
        *value -= 1;
    }
}

fn clamp_index(value: &mut usize, len: usize) {
    if len == 0 {
        *value = 0;
    } else if *value >= len {
        *value = len - 1;
    }
}

pub fn format_card(card: &Card) -> String {
    format!("{} ({}) +{}xp", card.name, card.rarity, card.xp)
}

pub fn format_event(event: &Event) -> String {
    match event {
        Event::PacksOpened {
            packs,
            cost,
            cards,
            currency,
        } => format!("opened {packs} pack(s) for {cost}: {cards} cards, {currency} left"),
        Event::CardDrawn {
            name,
            rarity,
            xp,
            bonus,
        } => {
            let tag = if *bonus { " [lucky]" } else { "" };
            format!("drew {name} ({rarity}) +{xp}xp{tag}")
        }
        Event::LeveledUp {
            level,
            skill_points,
        } => format!("level up! now level {level}, {skill_points} skill point(s)"),
        Event::CardsSold {
            cards,
            value,
            currency,
        } => format!("sold {cards} cards for {value}, balance {currency}"),
        Event::SkillUnlocked {
            id,
            cost,
            skill_points,
        } => format!("unlocked {id} for {cost} pt, {skill_points} left"),
    }
}
