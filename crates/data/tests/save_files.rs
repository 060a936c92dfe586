use packclick_core::{EconomyConfig, EventBus, RngState, Session, SkillId};
use packclick_data::{clear_save, load_economy_config, load_game, save_game};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_file(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "packclick_save_test_{tag}_{}_{}.json",
        std::process::id(),
        nanos
    ))
}

fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

#[test]
fn shipped_economy_matches_defaults() {
    let config = load_economy_config(&assets_root()).expect("load config");
    assert_eq!(config, EconomyConfig::default());
}

#[test]
fn session_survives_save_and_load() {
    let path = unique_temp_file("roundtrip");
    let config = EconomyConfig {
        starting_currency: 1_000,
        ..EconomyConfig::default()
    };
    let mut session = Session::new(config.clone(), RngState::from_seed(3));
    let mut events = EventBus::default();
    session.open_packs(6, &mut events).expect("open");
    session.state.progress.skill_points += 2;
    session
        .unlock_skill(SkillId::BetterCards.as_str(), &mut events)
        .expect("unlock");

    save_game(&session.state, &path).expect("save");
    let loaded = load_game(&path, &config);
    assert_eq!(loaded.progress, session.state.progress);
    assert_eq!(loaded.inventory, session.state.inventory);
    assert_eq!(loaded.skills, session.state.skills);
    assert_eq!(loaded.stats, session.state.stats);

    assert!(clear_save(&path).expect("clear"));
    assert!(!clear_save(&path).expect("clear again"));
}

#[test]
fn missing_save_starts_fresh() {
    let path = unique_temp_file("missing");
    let config = EconomyConfig::default();
    let state = load_game(&path, &config);
    assert_eq!(state.progress.currency, 100);
    assert_eq!(state.progress.level, 1);
    assert!(state.inventory.is_empty());
}

#[test]
fn corrupt_save_starts_fresh() {
    let path = unique_temp_file("corrupt");
    std::fs::write(&path, "{\"currency\": 12").expect("write");
    let state = load_game(&path, &EconomyConfig::default());
    assert_eq!(state.progress.currency, 100);
    let _ = std::fs::remove_file(path);
}

#[test]
fn save_creates_missing_parent_dirs() {
    let dir = unique_temp_file("nested").with_extension("");
    let path = dir.join("deeper").join("save.json");
    let config = EconomyConfig::default();
    save_game(&packclick_core::GameState::new(&config), &path).expect("save");
    assert!(path.exists());
    let _ = std::fs::remove_dir_all(dir);
}
