use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::learn::LearnDifficulty;
use crate::engine::rescue::{RescueDifficulty, RescueStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Learn,
    Rescue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnSegment {
    pub segment_index: usize,
    pub accuracy: u32,
    pub avg_reaction_ms: u64,
    pub targets_completed: u32,
}

impl LearnSegment {
    pub fn empty(segment_index: usize) -> Self {
        Self {
            segment_index,
            accuracy: 100,
            avg_reaction_ms: 0,
            targets_completed: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnSessionTotals {
    pub correct_targets: u32,
    pub wrong_key_presses: u32,
    pub avg_reaction_ms: u64,
    pub p50: u64,
    pub p90: u64,
    pub hunt_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnSession {
    pub mode: SessionMode,
    pub created_at: DateTime<Utc>,
    pub duration_sec: u32,
    pub difficulty: LearnDifficulty,
    pub totals: LearnSessionTotals,
    pub segments: Vec<LearnSegment>,
}

/// Terminal snapshot of a rescue run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RescueSession {
    pub mode: SessionMode,
    pub created_at: DateTime<Utc>,
    pub difficulty: RescueDifficulty,
    pub status: RescueStatus,
    pub words_completed: u32,
    pub word_goal: u32,
    pub time_left_ms: u64,
    #[serde(default)]
    pub duration_ms: u64,
    pub meter_peak: f64,
    pub meter_max: f64,
    pub wpm: u32,
    pub accuracy: u32,
}

impl RescueSession {
    pub fn is_win(&self) -> bool {
        self.status == RescueStatus::Won
    }
}
