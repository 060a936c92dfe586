use anyhow::Context;
use packclick_core::EconomyConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const ECONOMY_FILE: &str = "economy.json";

/// Loads `economy.json` from the assets directory. A missing file means the
/// built-in defaults; a present file must parse and validate.
pub fn load_economy_config(dir: &Path) -> anyhow::Result<EconomyConfig> {
    let path = dir.join(ECONOMY_FILE);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no economy file, using defaults");
        return Ok(EconomyConfig::default());
    }
    let config: EconomyConfig = load_json(&path)?;
    config
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "packclick_load_test_{}_{}",
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = unique_temp_dir();
        let config = load_economy_config(&dir).expect("config");
        assert_eq!(config, EconomyConfig::default());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = unique_temp_dir();
        fs::write(dir.join(ECONOMY_FILE), r#"{"pack_cost": 80}"#).expect("write");
        let config = load_economy_config(&dir).expect("config");
        assert_eq!(config.pack_cost, 80);
        assert_eq!(config.cards_per_pack, 5);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = unique_temp_dir();
        fs::write(dir.join(ECONOMY_FILE), r#"{"level_growth": 0.5}"#).expect("write");
        let err = load_economy_config(&dir).expect_err("invalid");
        assert!(format!("{err:#}").contains("level_growth"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn malformed_json_reports_path() {
        let dir = unique_temp_dir();
        fs::write(dir.join(ECONOMY_FILE), "{ nope").expect("write");
        let err = load_economy_config(&dir).expect_err("malformed");
        assert!(format!("{err:#}").contains(ECONOMY_FILE));
        let _ = fs::remove_dir_all(dir);
    }
}
