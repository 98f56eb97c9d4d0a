use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::metrics::TypingMetrics;
use crate::session::result::{LearnSession, RescueSession};

const SCHEMA_VERSION: u32 = 1;

/// Most-recent-first histories keep at most this many records.
pub const HISTORY_LIMIT: usize = 200;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Lifetime free-play stats, merged one session at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingStats {
    pub sessions: u32,
    pub best_wpm: u32,
    pub average_wpm: u32,
    pub accuracy: u32,
    pub total_characters: u64,
    pub last_played: Option<DateTime<Utc>>,
}

impl Default for TypingStats {
    fn default() -> Self {
        Self {
            sessions: 0,
            best_wpm: 0,
            average_wpm: 0,
            accuracy: 100,
            total_characters: 0,
            last_played: None,
        }
    }
}

impl TypingStats {
    pub fn record(&mut self, metrics: &TypingMetrics, played_at: DateTime<Utc>) {
        let previous = self.sessions as f64;
        let sessions = self.sessions + 1;
        let running_mean = |old: u32, new: u32| {
            ((old as f64 * previous + new as f64) / sessions as f64).round() as u32
        };

        self.average_wpm = running_mean(self.average_wpm, metrics.wpm);
        self.accuracy = running_mean(self.accuracy, metrics.accuracy);
        self.best_wpm = self.best_wpm.max(metrics.wpm);
        self.total_characters += metrics.characters as u64;
        self.sessions = sessions;
        self.last_played = Some(played_at);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub stats: TypingStats,
}

impl Default for StatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: TypingStats::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnHistoryData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub sessions: Vec<LearnSession>,
}

impl Default for LearnHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl LearnHistoryData {
    pub fn push_front(&mut self, session: LearnSession) {
        push_capped(&mut self.sessions, session);
    }

    pub fn summary(&self) -> LearnHistorySummary {
        let best_accuracy = self
            .sessions
            .iter()
            .map(|s| {
                let total = s.totals.correct_targets + s.totals.wrong_key_presses;
                if total == 0 {
                    0.0
                } else {
                    s.totals.correct_targets as f64 / total as f64 * 100.0
                }
            })
            .fold(0.0, f64::max);

        // Sessions without a single hit report 0 ms and never count as best
        let best_avg_reaction_ms = self
            .sessions
            .iter()
            .map(|s| s.totals.avg_reaction_ms)
            .filter(|&ms| ms > 0)
            .min();

        LearnHistorySummary {
            sessions: self.sessions.len(),
            best_accuracy: best_accuracy.round() as u32,
            best_avg_reaction_ms,
            last_session: self.sessions.first().map(|s| s.created_at),
        }
    }
}

/// Aggregates over the stored learn sessions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LearnHistorySummary {
    pub sessions: usize,
    pub best_accuracy: u32,
    pub best_avg_reaction_ms: Option<u64>,
    pub last_session: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RescueHistoryData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub sessions: Vec<RescueSession>,
}

impl Default for RescueHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl RescueHistoryData {
    pub fn push_front(&mut self, session: RescueSession) {
        push_capped(&mut self.sessions, session);
    }
}

fn push_capped<T>(records: &mut Vec<T>, record: T) {
    records.insert(0, record);
    records.truncate(HISTORY_LIMIT);
}
