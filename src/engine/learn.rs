use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::engine::stats::{accuracy_percent, mean_rounded, percentile, round_to};
use crate::engine::{Millis, ParseDifficultyError};
use crate::generator::letters::next_target;
use crate::keyboard::finger::{FingerGuidance, guidance};
use crate::session::input::normalize_letter;
use crate::session::result::{
    LearnSegment, LearnSession, LearnSessionTotals, SessionMode,
};

pub const SESSION_DURATION_MS: Millis = 120_000;
pub const SEGMENT_COUNT: usize = 8;
pub const SEGMENT_DURATION_MS: Millis = SESSION_DURATION_MS / SEGMENT_COUNT as Millis;
pub const HUNT_THRESHOLD_MS: Millis = 900;
pub const FEEDBACK_MS: Millis = 180;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearnDifficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl LearnDifficulty {
    pub const ALL: [LearnDifficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for LearnDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LearnDifficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDifficultyError {
                given: s.to_string(),
                expected: "beginner, intermediate, advanced",
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearnStatus {
    Idle,
    Running,
    Complete,
}

/// Last scored key press, kept for [`FEEDBACK_MS`] so the host can flash it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyFeedback {
    pub key: char,
    pub correct: bool,
    pub at_ms: Millis,
}

#[derive(Clone, Copy, Debug, Default)]
struct SegmentAccumulator {
    correct: u32,
    wrong: u32,
    reaction_sum: Millis,
    targets: u32,
}

impl SegmentAccumulator {
    fn freeze(&self, segment_index: usize) -> LearnSegment {
        LearnSegment {
            segment_index,
            accuracy: accuracy_percent(self.correct, self.wrong),
            avg_reaction_ms: mean_rounded(self.reaction_sum, self.targets as u64),
            targets_completed: self.targets,
        }
    }
}

/// Everything the host needs to draw the drill.
#[derive(Clone, Debug, PartialEq)]
pub struct LearnSnapshot {
    pub status: LearnStatus,
    pub difficulty: LearnDifficulty,
    pub target: char,
    pub finger: FingerGuidance,
    pub time_left_ms: Millis,
    pub accuracy: u32,
    pub avg_reaction_ms: u64,
    pub p50: u64,
    pub p90: u64,
    pub hunt_rate: f64,
    pub segments: Vec<LearnSegment>,
    pub active_segment: usize,
    pub feedback: Option<KeyFeedback>,
    pub totals: LearnSessionTotals,
}

/// Two-minute reaction drill: one letter is shown at a time and the user
/// presses it as fast as possible.
pub struct LearnEngine<R: Rng = SmallRng> {
    difficulty: LearnDifficulty,
    status: LearnStatus,
    rng: R,
    target: char,
    pending: VecDeque<char>,
    started_at: Option<Millis>,
    target_shown_at: Millis,
    time_left_ms: Millis,
    active_segment: usize,
    reactions: Vec<Millis>,
    hunt_events: u32,
    correct_targets: u32,
    wrong_key_presses: u32,
    segments: Vec<SegmentAccumulator>,
    feedback: Option<KeyFeedback>,
    totals: LearnSessionTotals,
    finished: Option<LearnSession>,
}

impl LearnEngine<SmallRng> {
    pub fn new(difficulty: LearnDifficulty, at_ms: Millis) -> Self {
        Self::with_rng(difficulty, SmallRng::from_entropy(), at_ms)
    }
}

impl<R: Rng> LearnEngine<R> {
    pub fn with_rng(difficulty: LearnDifficulty, rng: R, at_ms: Millis) -> Self {
        let mut engine = Self {
            difficulty,
            status: LearnStatus::Idle,
            rng,
            target: 'a',
            pending: VecDeque::new(),
            started_at: None,
            target_shown_at: at_ms,
            time_left_ms: SESSION_DURATION_MS,
            active_segment: 0,
            reactions: Vec::new(),
            hunt_events: 0,
            correct_targets: 0,
            wrong_key_presses: 0,
            segments: vec![SegmentAccumulator::default(); SEGMENT_COUNT],
            feedback: None,
            totals: LearnSessionTotals::default(),
            finished: None,
        };
        engine.reset(at_ms);
        engine
    }

    /// Discard the current session (nothing is recorded) and start a fresh idle one.
    pub fn reset(&mut self, at_ms: Millis) {
        self.pending.clear();
        self.target = next_target(self.difficulty, &mut self.pending, &mut self.rng);
        self.status = LearnStatus::Idle;
        self.started_at = None;
        self.target_shown_at = at_ms;
        self.time_left_ms = SESSION_DURATION_MS;
        self.active_segment = 0;
        self.reactions.clear();
        self.hunt_events = 0;
        self.correct_targets = 0;
        self.wrong_key_presses = 0;
        self.segments = vec![SegmentAccumulator::default(); SEGMENT_COUNT];
        self.feedback = None;
        self.totals = LearnSessionTotals::default();
        self.finished = None;
    }

    pub fn set_difficulty(&mut self, difficulty: LearnDifficulty, at_ms: Millis) {
        self.difficulty = difficulty;
        self.reset(at_ms);
    }

    pub fn status(&self) -> LearnStatus {
        self.status
    }

    pub fn target(&self) -> char {
        self.target
    }

    /// The record produced by the last finalize, if the session is complete.
    pub fn finished(&self) -> Option<&LearnSession> {
        self.finished.as_ref()
    }

    fn segment_index(&self, at_ms: Millis) -> usize {
        let elapsed = self
            .started_at
            .map(|start| at_ms.saturating_sub(start))
            .unwrap_or(0);
        ((elapsed / SEGMENT_DURATION_MS) as usize).min(SEGMENT_COUNT - 1)
    }

    /// Score one key press. Non-letters and presses after completion are ignored.
    pub fn press_key(&mut self, key: char, at_ms: Millis) {
        if self.status == LearnStatus::Complete {
            return;
        }
        let Some(key) = normalize_letter(key) else {
            return;
        };

        if self.started_at.is_none() {
            self.started_at = Some(at_ms);
            self.status = LearnStatus::Running;
            tracing::debug!(difficulty = %self.difficulty, "learn session started");
        }

        let segment = self.segment_index(at_ms);

        if key != self.target {
            self.wrong_key_presses += 1;
            self.segments[segment].wrong += 1;
            self.feedback = Some(KeyFeedback {
                key,
                correct: false,
                at_ms,
            });
            self.refresh_totals();
            return;
        }

        let reaction = at_ms.saturating_sub(self.target_shown_at);
        self.reactions.push(reaction);
        self.correct_targets += 1;
        let acc = &mut self.segments[segment];
        acc.correct += 1;
        acc.reaction_sum += reaction;
        acc.targets += 1;
        if reaction > HUNT_THRESHOLD_MS {
            self.hunt_events += 1;
        }

        self.feedback = Some(KeyFeedback {
            key,
            correct: true,
            at_ms,
        });
        self.target = next_target(self.difficulty, &mut self.pending, &mut self.rng);
        self.target_shown_at = at_ms;
        self.refresh_totals();
    }

    /// Advance the countdown. Returns the finalized record when time runs out.
    pub fn tick(&mut self, at_ms: Millis) -> Option<LearnSession> {
        if let Some(feedback) = self.feedback
            && at_ms.saturating_sub(feedback.at_ms) >= FEEDBACK_MS
        {
            self.feedback = None;
        }

        if self.status != LearnStatus::Running {
            return None;
        }

        let elapsed = self
            .started_at
            .map(|start| at_ms.saturating_sub(start))
            .unwrap_or(0);
        self.time_left_ms = SESSION_DURATION_MS.saturating_sub(elapsed);
        self.active_segment = self.segment_index(at_ms);

        if self.time_left_ms == 0 {
            return self.finalize(at_ms);
        }
        None
    }

    /// End a running session now and build its record.
    pub fn finalize(&mut self, at_ms: Millis) -> Option<LearnSession> {
        if self.status != LearnStatus::Running {
            return None;
        }

        self.refresh_totals();
        let session = LearnSession {
            mode: SessionMode::Learn,
            created_at: Utc::now(),
            duration_sec: (SESSION_DURATION_MS / 1000) as u32,
            difficulty: self.difficulty,
            totals: self.totals.clone(),
            segments: self.frozen_segments(),
        };

        self.active_segment = self.segment_index(at_ms);
        self.status = LearnStatus::Complete;
        self.finished = Some(session.clone());
        tracing::debug!(
            difficulty = %self.difficulty,
            correct = self.totals.correct_targets,
            wrong = self.totals.wrong_key_presses,
            "learn session complete"
        );
        Some(session)
    }

    fn refresh_totals(&mut self) {
        let hunt_rate = if self.correct_targets == 0 {
            0.0
        } else {
            round_to(self.hunt_events as f64 / self.correct_targets as f64, 2)
        };
        let reaction_sum: Millis = self.reactions.iter().sum();
        self.totals = LearnSessionTotals {
            correct_targets: self.correct_targets,
            wrong_key_presses: self.wrong_key_presses,
            avg_reaction_ms: mean_rounded(reaction_sum, self.reactions.len() as u64),
            p50: percentile(&self.reactions, 50.0),
            p90: percentile(&self.reactions, 90.0),
            hunt_rate,
        };
    }

    fn frozen_segments(&self) -> Vec<LearnSegment> {
        self.segments
            .iter()
            .enumerate()
            .map(|(idx, acc)| acc.freeze(idx))
            .collect()
    }

    pub fn accuracy(&self) -> u32 {
        accuracy_percent(self.correct_targets, self.wrong_key_presses)
    }

    pub fn snapshot(&self) -> LearnSnapshot {
        LearnSnapshot {
            status: self.status,
            difficulty: self.difficulty,
            target: self.target,
            finger: guidance(self.target),
            time_left_ms: self.time_left_ms,
            accuracy: self.accuracy(),
            avg_reaction_ms: self.totals.avg_reaction_ms,
            p50: self.totals.p50,
            p90: self.totals.p90,
            hunt_rate: self.totals.hunt_rate,
            segments: self.frozen_segments(),
            active_segment: self.active_segment,
            feedback: self.feedback,
            totals: self.totals.clone(),
        }
    }
}
