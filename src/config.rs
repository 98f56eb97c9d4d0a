use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::learn::LearnDifficulty;
use crate::engine::rescue::RescueDifficulty;

const MIN_TICK_MS: u64 = 50;
const MAX_TICK_MS: u64 = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub learn_difficulty: LearnDifficulty,
    #[serde(default)]
    pub rescue_difficulty: RescueDifficulty,
    #[serde(default = "default_pack")]
    pub pack: String,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_pack() -> String {
    "aurora".to_string()
}
fn default_tick_ms() -> u64 {
    200
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learn_difficulty: LearnDifficulty::default(),
            rescue_difficulty: RescueDifficulty::default(),
            pack: default_pack(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typequest")
            .join("config.toml")
    }

    /// Clamp out-of-range values and reset an unknown pack id.
    /// Call after deserialization so stale config files stay usable.
    pub fn validate(&mut self, valid_packs: &[&str]) {
        self.tick_ms = self.tick_ms.clamp(MIN_TICK_MS, MAX_TICK_MS);
        if !valid_packs.contains(&self.pack.as_str()) {
            self.pack = valid_packs
                .first()
                .map(|p| p.to_string())
                .unwrap_or_else(default_pack);
        }
    }
}
