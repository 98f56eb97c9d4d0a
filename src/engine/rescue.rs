use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::{Millis, ParseDifficultyError};
use crate::generator::rescue_targets::{FALLBACK_TARGETS, build_targets};

const MAX_STREAK_BONUS: u32 = 6;
const STREAK_BONUS_FROM: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescueDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl RescueDifficulty {
    pub const ALL: [RescueDifficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn config(self) -> RescueConfig {
        match self {
            Self::Easy => RescueConfig {
                passive_fill_per_second: 0.75,
                typo_spike: 7.0,
                heal_on_complete: 22.0,
                meter_max: 100.0,
                word_goal: 18,
                duration_ms: 120_000,
            },
            Self::Medium => RescueConfig {
                passive_fill_per_second: 1.35,
                typo_spike: 11.0,
                heal_on_complete: 16.0,
                meter_max: 100.0,
                word_goal: 20,
                duration_ms: 120_000,
            },
            Self::Hard => RescueConfig {
                passive_fill_per_second: 2.6,
                typo_spike: 18.0,
                heal_on_complete: 11.0,
                meter_max: 100.0,
                word_goal: 22,
                duration_ms: 120_000,
            },
        }
    }
}

impl fmt::Display for RescueDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RescueDifficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDifficultyError {
                given: s.to_string(),
                expected: "easy, medium, hard",
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RescueConfig {
    pub passive_fill_per_second: f64,
    pub typo_spike: f64,
    pub heal_on_complete: f64,
    pub meter_max: f64,
    pub word_goal: u32,
    pub duration_ms: Millis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescueStatus {
    Idle,
    Running,
    Won,
    Lost,
}

/// Heal bonus for a clean-word streak: nothing until the third word, then
/// one more per word up to +6.
pub fn streak_bonus(streak: u32) -> u32 {
    streak.saturating_sub(STREAK_BONUS_FROM).min(MAX_STREAK_BONUS)
}

/// One rescue run. Every operation other than `reset`/`set_difficulty` is a
/// no-op unless the run is `Running`; `Won` and `Lost` are final.
#[derive(Clone, Debug, PartialEq)]
pub struct RescueState {
    pub status: RescueStatus,
    pub difficulty: RescueDifficulty,
    pub meter: f64,
    pub meter_max: f64,
    pub time_left_ms: Millis,
    pub word_goal: u32,
    pub completed: u32,
    pub streak: u32,
    pub target: String,
    pub target_index: usize,
    pub targets: Vec<String>,
    pub meter_peak: f64,
}

impl RescueState {
    pub fn new(difficulty: RescueDifficulty) -> Self {
        Self::with_targets(difficulty, build_targets(difficulty))
    }

    pub fn with_targets(difficulty: RescueDifficulty, targets: Vec<String>) -> Self {
        let config = difficulty.config();
        let targets = if targets.is_empty() {
            FALLBACK_TARGETS.iter().map(|w| w.to_string()).collect()
        } else {
            targets
        };
        Self {
            status: RescueStatus::Idle,
            difficulty,
            meter: 0.0,
            meter_max: config.meter_max,
            time_left_ms: config.duration_ms,
            word_goal: config.word_goal,
            completed: 0,
            streak: 0,
            target: targets[0].clone(),
            target_index: 0,
            targets,
            meter_peak: 0.0,
        }
    }

    pub fn config(&self) -> RescueConfig {
        self.difficulty.config()
    }

    pub fn is_running(&self) -> bool {
        self.status == RescueStatus::Running
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, RescueStatus::Won | RescueStatus::Lost)
    }

    pub fn meter_percent(&self) -> u32 {
        if self.meter_max <= 0.0 {
            return 0;
        }
        (self.meter / self.meter_max * 100.0).round().clamp(0.0, 100.0) as u32
    }

    pub fn start_run(&mut self) {
        if self.status == RescueStatus::Idle {
            self.status = RescueStatus::Running;
            tracing::debug!(difficulty = %self.difficulty, "rescue run started");
        }
    }

    /// Passive meter fill and countdown. A full meter loses even if the
    /// word goal or the clock would also end the run on this tick.
    pub fn apply_time_tick(&mut self, delta_ms: Millis) {
        if !self.is_running() {
            return;
        }
        let fill = self.config().passive_fill_per_second * delta_ms as f64 / 1000.0;
        self.meter = (self.meter + fill).min(self.meter_max);
        self.meter_peak = self.meter_peak.max(self.meter);
        self.time_left_ms = self.time_left_ms.saturating_sub(delta_ms);

        if self.meter >= self.meter_max {
            self.finish(RescueStatus::Lost);
        } else if self.completed >= self.word_goal || self.time_left_ms == 0 {
            self.finish(RescueStatus::Won);
        }
    }

    pub fn apply_typo_spike(&mut self) {
        if !self.is_running() {
            return;
        }
        self.meter = (self.meter + self.config().typo_spike).min(self.meter_max);
        self.meter_peak = self.meter_peak.max(self.meter);
        self.streak = 0;
        if self.meter >= self.meter_max {
            self.finish(RescueStatus::Lost);
        }
    }

    /// The typed text matched the current target.
    pub fn complete_target(&mut self) {
        if !self.is_running() {
            return;
        }
        self.streak += 1;
        let heal = self.config().heal_on_complete + streak_bonus(self.streak) as f64;
        self.meter_peak = self.meter_peak.max(self.meter);
        self.meter = (self.meter - heal).max(0.0);
        self.completed += 1;
        self.target_index = (self.target_index + 1) % self.targets.len();
        self.target = self.targets[self.target_index].clone();

        if self.completed >= self.word_goal {
            self.finish(RescueStatus::Won);
        }
    }

    /// Fresh idle run at the same difficulty.
    pub fn reset(&mut self) {
        *self = Self::with_targets(self.difficulty, std::mem::take(&mut self.targets));
    }

    pub fn set_difficulty(&mut self, difficulty: RescueDifficulty) {
        *self = Self::new(difficulty);
    }

    fn finish(&mut self, status: RescueStatus) {
        self.status = status;
        tracing::debug!(
            difficulty = %self.difficulty,
            ?status,
            completed = self.completed,
            meter_peak = self.meter_peak,
            "rescue run ended"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("word{i}")).collect()
    }

    fn running(difficulty: RescueDifficulty) -> RescueState {
        let mut state = RescueState::with_targets(difficulty, words(3));
        state.start_run();
        state
    }

    #[test]
    fn test_streak_bonus() {
        assert_eq!(streak_bonus(0), 0);
        assert_eq!(streak_bonus(2), 0);
        assert_eq!(streak_bonus(3), 1);
        assert_eq!(streak_bonus(8), 6);
        assert_eq!(streak_bonus(100), 6);
    }

    #[test]
    fn test_new_state_is_idle_and_full_clock() {
        let state = RescueState::new(RescueDifficulty::Easy);
        assert_eq!(state.status, RescueStatus::Idle);
        assert_eq!(state.time_left_ms, 120_000);
        assert_eq!(state.word_goal, 18);
        assert_eq!(state.target, state.targets[0]);
        assert_eq!(state.meter, 0.0);
    }

    #[test]
    fn test_empty_targets_use_fallback() {
        let state = RescueState::with_targets(RescueDifficulty::Hard, Vec::new());
        assert_eq!(state.target, "glass");
    }

    #[test]
    fn test_operations_ignored_while_idle() {
        let mut state = RescueState::with_targets(RescueDifficulty::Medium, words(3));
        let before = state.clone();
        state.apply_time_tick(5_000);
        state.apply_typo_spike();
        state.complete_target();
        assert_eq!(state, before);
    }

    #[test]
    fn test_start_run_only_from_idle() {
        let mut state = running(RescueDifficulty::Medium);
        state.start_run();
        assert!(state.is_running());
        state.status = RescueStatus::Lost;
        state.start_run();
        assert_eq!(state.status, RescueStatus::Lost);
    }

    #[test]
    fn test_tick_fills_meter_and_counts_down() {
        let mut state = running(RescueDifficulty::Hard);
        state.apply_time_tick(1_000);
        assert!((state.meter - 2.6).abs() < 1e-9);
        assert_eq!(state.meter_peak, state.meter);
        assert_eq!(state.time_left_ms, 119_000);
        assert!(state.is_running());
    }

    #[test]
    fn test_clock_running_out_wins() {
        let mut state = running(RescueDifficulty::Easy);
        state.apply_time_tick(120_000);
        assert_eq!(state.time_left_ms, 0);
        assert_eq!(state.status, RescueStatus::Won);
    }

    #[test]
    fn test_full_meter_beats_word_goal_on_same_tick() {
        let mut state = running(RescueDifficulty::Medium);
        state.completed = state.word_goal;
        state.meter = 99.9;
        state.apply_time_tick(200);
        assert_eq!(state.meter, state.meter_max);
        assert_eq!(state.status, RescueStatus::Lost);
    }

    #[test]
    fn test_typo_spike_scenario() {
        let mut state = running(RescueDifficulty::Easy);
        state.meter = 90.0;
        state.streak = 4;
        state.apply_typo_spike();
        assert_eq!(state.meter, 97.0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.status, RescueStatus::Running);
        state.apply_typo_spike();
        assert_eq!(state.meter, 100.0);
        assert_eq!(state.status, RescueStatus::Lost);
        assert_eq!(state.meter_peak, 100.0);
    }

    #[test]
    fn test_complete_heals_with_streak_bonus() {
        let mut state = running(RescueDifficulty::Medium);
        state.meter = 80.0;
        state.complete_target();
        assert_eq!(state.meter, 64.0);
        state.complete_target();
        assert_eq!(state.meter, 48.0);
        // Third clean word earns +1
        state.meter = 80.0;
        state.complete_target();
        assert_eq!(state.meter, 63.0);
        assert_eq!(state.streak, 3);
        assert_eq!(state.completed, 3);
    }

    #[test]
    fn test_heal_floors_at_zero() {
        let mut state = running(RescueDifficulty::Easy);
        state.meter = 5.0;
        state.complete_target();
        assert_eq!(state.meter, 0.0);
    }

    #[test]
    fn test_targets_cycle() {
        let mut state = running(RescueDifficulty::Hard);
        let order: Vec<String> = (0..4)
            .map(|_| {
                state.complete_target();
                state.target.clone()
            })
            .collect();
        assert_eq!(order, vec!["word1", "word2", "word0", "word1"]);
    }

    #[test]
    fn test_word_goal_wins_immediately() {
        let mut state = running(RescueDifficulty::Easy);
        state.completed = state.word_goal - 1;
        state.complete_target();
        assert_eq!(state.status, RescueStatus::Won);
        // Terminal: later events leave it untouched
        let frozen = state.clone();
        state.apply_time_tick(1_000);
        state.apply_typo_spike();
        state.complete_target();
        assert_eq!(state, frozen);
    }

    #[test]
    fn test_meter_stays_in_bounds() {
        let mut state = running(RescueDifficulty::Hard);
        for step in 0..400 {
            match step % 5 {
                0 | 1 => state.apply_time_tick(700),
                2 => state.apply_typo_spike(),
                _ => state.complete_target(),
            }
            assert!(state.meter >= 0.0 && state.meter <= state.meter_max);
            if state.is_terminal() {
                state.reset();
                state.start_run();
            }
        }
    }

    #[test]
    fn test_reset_from_terminal() {
        let mut state = running(RescueDifficulty::Hard);
        state.meter = 99.0;
        state.apply_typo_spike();
        assert_eq!(state.status, RescueStatus::Lost);
        state.reset();
        assert_eq!(state.status, RescueStatus::Idle);
        assert_eq!(state.meter, 0.0);
        assert_eq!(state.meter_peak, 0.0);
        assert_eq!(state.target, "word0");
        assert_eq!(state.difficulty, RescueDifficulty::Hard);
    }

    #[test]
    fn test_set_difficulty_rebuilds() {
        let mut state = running(RescueDifficulty::Hard);
        state.set_difficulty(RescueDifficulty::Easy);
        assert_eq!(state.status, RescueStatus::Idle);
        assert_eq!(state.word_goal, 18);
        assert_eq!(state.target, "cat");
    }

    #[test]
    fn test_meter_percent() {
        let mut state = running(RescueDifficulty::Easy);
        state.meter = 33.4;
        assert_eq!(state.meter_percent(), 33);
    }
}
