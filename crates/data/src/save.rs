use anyhow::Context;
use packclick_core::{EconomyConfig, GameState, InventoryEntry, Snapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const SAVE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    #[serde(flatten)]
    snapshot: Snapshot,
}

pub fn default_save_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("PACKCLICK_SAVE") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".packclick_save.json"))
}

pub fn encode_snapshot(snapshot: &Snapshot) -> anyhow::Result<String> {
    let payload = SaveFile {
        version: SAVE_SCHEMA_VERSION,
        snapshot: snapshot.clone(),
    };
    serde_json::to_string_pretty(&payload).context("serialize save")
}

/// Decodes a save body without ever failing. Every top-level field is read on
/// its own; a missing or malformed field falls back to its default while the
/// rest of the save is kept.
pub fn decode_snapshot(raw: &str) -> Snapshot {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "save is not valid json, starting fresh");
            return Snapshot::default();
        }
    };
    let Some(object) = value.as_object() else {
        tracing::warn!("save is not a json object, starting fresh");
        return Snapshot::default();
    };
    if let Some(version) = field::<u32>(object, "version") {
        if version > SAVE_SCHEMA_VERSION {
            tracing::warn!(
                version,
                expected = SAVE_SCHEMA_VERSION,
                "save written by a newer version, reading known fields"
            );
        }
    }

    let defaults = Snapshot::default();
    Snapshot {
        currency: field(object, "currency").unwrap_or(defaults.currency),
        xp: field(object, "xp").unwrap_or(defaults.xp),
        level: field(object, "level").unwrap_or(defaults.level),
        skill_points: field(object, "skillPoints").unwrap_or(defaults.skill_points),
        inventory: decode_inventory(object.get("inventory")),
        skills: field(object, "skills").unwrap_or(defaults.skills),
        stats: field(object, "stats").unwrap_or(defaults.stats),
    }
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, name: &str) -> Option<T> {
    let value = object.get(name)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(field = name, %err, "ignoring malformed save field");
            None
        }
    }
}

fn decode_inventory(value: Option<&Value>) -> BTreeMap<String, InventoryEntry> {
    let Some(entries) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(key, raw)| match serde_json::from_value(raw.clone()) {
            Ok(entry) => Some((key.clone(), entry)),
            Err(err) => {
                tracing::warn!(key = %key, %err, "dropping malformed inventory entry");
                None
            }
        })
        .collect()
}

pub fn save_game(state: &GameState, path: &Path) -> anyhow::Result<()> {
    let body = encode_snapshot(&Snapshot::capture(state))?;
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, body).with_context(|| format!("write {}", staging.display()))?;
    fs::rename(&staging, path).with_context(|| format!("replace {}", path.display()))?;
    tracing::debug!(path = %path.display(), "game saved");
    Ok(())
}

/// Loads a save, falling back to a fresh game when the file is missing or
/// unreadable. Never fails.
pub fn load_game(path: &Path, config: &EconomyConfig) -> GameState {
    match fs::read_to_string(path) {
        Ok(raw) => decode_snapshot(&raw).restore(config),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no save yet");
            GameState::new(config)
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "could not read save, starting fresh");
            GameState::new(config)
        }
    }
}

/// Deletes the save. Returns whether a file was removed.
pub fn clear_save(path: &Path) -> anyhow::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packclick_core::{Rarity, SkillId};

    #[test]
    fn encoded_save_carries_version_and_camel_case_fields() {
        let body = encode_snapshot(&Snapshot::default()).expect("encode");
        let value: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(value["version"], SAVE_SCHEMA_VERSION);
        assert_eq!(value["currency"], 100);
        assert_eq!(value["skillPoints"], 0);
    }

    #[test]
    fn browser_save_layout_is_accepted() {
        let raw = r#"{
            "currency": 35,
            "xp": 40,
            "level": 2,
            "skillPoints": 1,
            "inventory": {
                "Excalibur_legendary": {
                    "name": "Excalibur", "rarity": "legendary", "xp": 100, "value": 75, "count": 2
                }
            },
            "skills": {"pack_discount": true, "better_cards": false}
        }"#;
        let state = decode_snapshot(raw).restore(&EconomyConfig::default());
        assert_eq!(state.progress.currency, 35);
        assert_eq!(state.progress.level, 2);
        assert_eq!(state.progress.skill_points, 1);
        assert!(state.skills.has(SkillId::PackDiscount));
        assert!(!state.skills.has(SkillId::BetterCards));
        let entry = state.inventory.get("Excalibur_legendary").expect("entry");
        assert_eq!(entry.rarity, Rarity::Legendary);
        assert_eq!(entry.count, 2);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        assert_eq!(decode_snapshot("not json"), Snapshot::default());
        assert_eq!(decode_snapshot("[1, 2, 3]"), Snapshot::default());
        assert_eq!(decode_snapshot("{}"), Snapshot::default());
    }

    #[test]
    fn bad_fields_default_independently() {
        let raw = r#"{
            "currency": "lots",
            "xp": 12,
            "level": -3,
            "inventory": {
                "Iron Dagger_common": {"name": "Iron Dagger", "rarity": "common", "xp": 10, "value": 5, "count": 3},
                "broken": {"name": "Broken", "rarity": "mythic"}
            }
        }"#;
        let snapshot = decode_snapshot(raw);
        assert_eq!(snapshot.currency, 100);
        assert_eq!(snapshot.xp, 12);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.inventory.len(), 1);
        assert!(snapshot.inventory.contains_key("Iron Dagger_common"));
    }

    #[test]
    fn zero_currency_is_kept() {
        let snapshot = decode_snapshot(r#"{"currency": 0}"#);
        assert_eq!(snapshot.currency, 0);
    }
}
