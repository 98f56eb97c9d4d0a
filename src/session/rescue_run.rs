use chrono::Utc;

use crate::engine::Millis;
use crate::engine::rescue::{RescueDifficulty, RescueState};
use crate::session::input::TypoTracker;
use crate::session::metrics::{TypingMetrics, calculate_metrics, clamp_input};
use crate::session::result::{RescueSession, SessionMode};

/// Drives a [`RescueState`] from a raw text-input buffer.
pub struct RescueRun {
    state: RescueState,
    input: String,
    typos: TypoTracker,
    attempt_started_at: Option<Millis>,
    metrics: Option<TypingMetrics>,
    last_metrics: Option<TypingMetrics>,
    heal_pulses: u32,
    error_pulses: u32,
    recorded: bool,
}

impl RescueRun {
    pub fn new(difficulty: RescueDifficulty) -> Self {
        Self::from_state(RescueState::new(difficulty))
    }

    pub fn from_state(state: RescueState) -> Self {
        Self {
            state,
            input: String::new(),
            typos: TypoTracker::new(),
            attempt_started_at: None,
            metrics: None,
            last_metrics: None,
            heal_pulses: 0,
            error_pulses: 0,
            recorded: false,
        }
    }

    pub fn state(&self) -> &RescueState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Live metrics for the word being typed.
    pub fn metrics(&self) -> Option<&TypingMetrics> {
        self.metrics.as_ref()
    }

    /// Bumped on every completed word; hosts animate on change.
    pub fn heal_pulses(&self) -> u32 {
        self.heal_pulses
    }

    /// Bumped on every typo charge.
    pub fn error_pulses(&self) -> u32 {
        self.error_pulses
    }

    /// Feed the whole current input buffer. The first input starts the run.
    pub fn handle_input(&mut self, value: &str, at_ms: Millis) {
        if self.state.is_terminal() {
            return;
        }
        self.state.start_run();

        let value = clamp_input(value, &self.state.target).to_string();
        if self.attempt_started_at.is_none() && !value.is_empty() {
            self.attempt_started_at = Some(at_ms);
        }

        for _ in self.typos.new_typos(&self.state.target, &value) {
            self.state.apply_typo_spike();
            self.error_pulses += 1;
        }

        if let Some(started) = self.attempt_started_at {
            let metrics = calculate_metrics(&self.state.target, &value, at_ms.saturating_sub(started));
            self.metrics = Some(metrics);
            self.last_metrics = Some(metrics);
        }

        if value == self.state.target {
            self.typos.clear();
            self.attempt_started_at = None;
            self.state.complete_target();
            self.heal_pulses += 1;
            self.input.clear();
            self.metrics = None;
        } else {
            self.input = value;
        }
    }

    pub fn tick(&mut self, delta_ms: Millis) {
        self.state.apply_time_tick(delta_ms);
    }

    /// The record for a finished run. Yields it once per terminal state.
    pub fn take_record(&mut self) -> Option<RescueSession> {
        if !self.state.is_terminal() || self.recorded {
            return None;
        }
        self.recorded = true;
        let metrics = self.last_metrics.unwrap_or_default();
        let config = self.state.config();
        Some(RescueSession {
            mode: SessionMode::Rescue,
            created_at: Utc::now(),
            difficulty: self.state.difficulty,
            status: self.state.status,
            words_completed: self.state.completed,
            word_goal: self.state.word_goal,
            time_left_ms: self.state.time_left_ms,
            duration_ms: config.duration_ms.saturating_sub(self.state.time_left_ms),
            meter_peak: self.state.meter_peak,
            meter_max: self.state.meter_max,
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
        })
    }

    /// Abandon the run without producing a record.
    pub fn reset(&mut self) {
        self.state.reset();
        self.clear_attempt();
    }

    pub fn set_difficulty(&mut self, difficulty: RescueDifficulty) {
        self.state.set_difficulty(difficulty);
        self.clear_attempt();
    }

    fn clear_attempt(&mut self) {
        self.input.clear();
        self.typos.clear();
        self.attempt_started_at = None;
        self.metrics = None;
        self.last_metrics = None;
        self.recorded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rescue::RescueStatus;

    fn run_with(difficulty: RescueDifficulty, targets: &[&str]) -> RescueRun {
        RescueRun::from_state(RescueState::with_targets(
            difficulty,
            targets.iter().map(|t| t.to_string()).collect(),
        ))
    }

    /// Type `text` one character at a time starting at `at`, 100ms apart.
    fn type_text(run: &mut RescueRun, text: &str, at: Millis) -> Millis {
        let mut buffer = run.input().to_string();
        let mut now = at;
        for ch in text.chars() {
            buffer.push(ch);
            now += 100;
            run.handle_input(&buffer, now);
            if run.input().is_empty() {
                buffer.clear();
            }
        }
        now
    }

    #[test]
    fn first_input_starts_run() {
        let mut run = run_with(RescueDifficulty::Easy, &["cat"]);
        assert_eq!(run.state().status, RescueStatus::Idle);
        run.handle_input("c", 100);
        assert_eq!(run.state().status, RescueStatus::Running);
        assert_eq!(run.input(), "c");
    }

    #[test]
    fn completing_word_heals_and_advances() {
        let mut run = run_with(RescueDifficulty::Easy, &["cat", "sun"]);
        run.handle_input("c", 0);
        run.tick(10_000);
        let meter_before = run.state().meter;
        assert!(meter_before > 0.0);

        type_text(&mut run, "at", 0);
        assert_eq!(run.state().completed, 1);
        assert_eq!(run.state().target, "sun");
        assert_eq!(run.state().meter, 0.0);
        assert_eq!(run.input(), "");
        assert!(run.metrics().is_none());
        assert_eq!(run.heal_pulses(), 1);
    }

    #[test]
    fn typo_charged_once_per_position() {
        let mut run = run_with(RescueDifficulty::Easy, &["cat"]);
        run.handle_input("x", 100);
        assert_eq!(run.state().meter, 7.0);
        run.handle_input("xa", 200);
        assert_eq!(run.state().meter, 7.0);
        // Backspace and retype the same wrong position
        run.handle_input("", 300);
        run.handle_input("y", 400);
        assert_eq!(run.state().meter, 7.0);
        assert_eq!(run.error_pulses(), 1);
    }

    #[test]
    fn typo_breaks_streak() {
        let mut run = run_with(RescueDifficulty::Medium, &["ab", "cd"]);
        let at = type_text(&mut run, "ab", 0);
        assert_eq!(run.state().streak, 1);
        run.handle_input("x", at + 100);
        assert_eq!(run.state().streak, 0);
    }

    #[test]
    fn overlong_input_is_clamped() {
        let mut run = run_with(RescueDifficulty::Easy, &["cat", "sun"]);
        run.handle_input("catsun", 100);
        assert_eq!(run.state().completed, 1);
        assert_eq!(run.state().meter, 0.0);
    }

    #[test]
    fn live_metrics_follow_attempt() {
        let mut run = run_with(RescueDifficulty::Easy, &["hello"]);
        run.handle_input("h", 1_000);
        run.handle_input("he", 2_000);
        let metrics = run.metrics().copied().expect("metrics after typing");
        assert_eq!(metrics.characters, 2);
        assert_eq!(metrics.duration_ms, 1_000);
        assert_eq!(metrics.accuracy, 100);
    }

    #[test]
    fn record_taken_once_after_loss() {
        let mut run = run_with(RescueDifficulty::Hard, &["abc"]);
        run.handle_input("a", 0);
        assert!(run.take_record().is_none());
        run.tick(200_000);
        assert_eq!(run.state().status, RescueStatus::Lost);

        let record = run.take_record().expect("terminal run has a record");
        assert_eq!(record.mode, SessionMode::Rescue);
        assert_eq!(record.status, RescueStatus::Lost);
        assert_eq!(record.meter_peak, 100.0);
        assert_eq!(record.difficulty, RescueDifficulty::Hard);
        assert!(run.take_record().is_none());

        // Input after the end is ignored
        run.handle_input("ab", 300_000);
        assert_eq!(run.input(), "a");
    }

    #[test]
    fn winning_by_goal_keeps_last_metrics() {
        let mut run = run_with(RescueDifficulty::Easy, &["go"]);
        let mut at = 0;
        for _ in 0..RescueDifficulty::Easy.config().word_goal {
            at = type_text(&mut run, "go", at);
        }
        assert_eq!(run.state().status, RescueStatus::Won);
        let record = run.take_record().expect("won run has a record");
        assert!(record.is_win());
        assert_eq!(record.words_completed, 18);
        assert_eq!(record.accuracy, 100);
        assert!(record.wpm > 0);
    }

    #[test]
    fn reset_discards_without_record() {
        let mut run = run_with(RescueDifficulty::Hard, &["abc"]);
        run.handle_input("x", 0);
        run.tick(200_000);
        run.reset();
        assert!(run.take_record().is_none());
        assert_eq!(run.state().status, RescueStatus::Idle);
        assert_eq!(run.input(), "");
        // Fresh attempt: the old typo position can be charged again
        run.handle_input("x", 10);
        assert_eq!(run.state().meter, 18.0);
    }
}
