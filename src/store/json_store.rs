use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::session::metrics::TypingMetrics;
use crate::session::result::{LearnSession, RescueSession};
use crate::store::schema::{LearnHistoryData, RescueHistoryData, StatsData, TypingStats};

const STATS_FILE: &str = "stats.json";
const LEARN_HISTORY_FILE: &str = "learn_history.json";
const RESCUE_HISTORY_FILE: &str = "rescue_history.json";

/// Session archive: lifetime stats plus capped learn and rescue histories,
/// one JSON file each.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typequest");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing, unreadable and malformed files all load as `T::default()`.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from));
        match parsed {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("ignoring unreadable {}: {e}", path.display());
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        tracing::debug!("saved {}", path.display());
        Ok(())
    }

    pub fn load_stats(&self) -> TypingStats {
        self.load::<StatsData>(STATS_FILE).stats
    }

    /// Merge one finished free-play session into the lifetime stats.
    pub fn record_session(&self, metrics: &TypingMetrics) -> Result<TypingStats> {
        let mut data: StatsData = self.load(STATS_FILE);
        data.stats.record(metrics, Utc::now());
        self.save(STATS_FILE, &data)?;
        Ok(data.stats)
    }

    pub fn reset_stats(&self) -> Result<TypingStats> {
        let data = StatsData::default();
        self.save(STATS_FILE, &data)?;
        Ok(data.stats)
    }

    pub fn load_learn_history(&self) -> LearnHistoryData {
        self.load(LEARN_HISTORY_FILE)
    }

    pub fn record_learn_session(&self, session: &LearnSession) -> Result<()> {
        let mut history = self.load_learn_history();
        history.push_front(session.clone());
        self.save(LEARN_HISTORY_FILE, &history)
    }

    pub fn load_rescue_history(&self) -> RescueHistoryData {
        self.load(RESCUE_HISTORY_FILE)
    }

    pub fn record_rescue_session(&self, session: &RescueSession) -> Result<()> {
        let mut history = self.load_rescue_history();
        history.push_front(session.clone());
        self.save(RESCUE_HISTORY_FILE, &history)
    }
}
