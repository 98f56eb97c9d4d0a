use serde::{Deserialize, Serialize};

const CHARS_PER_WORD: f64 = 5.0;
const MIN_MINUTES: f64 = 1.0 / 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Pending,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingMetrics {
    pub wpm: u32,
    pub accuracy: u32,
    pub correct: u32,
    pub errors: u32,
    pub duration_ms: u64,
    pub characters: u32,
}

/// Classify every target position against the typed attempt.
pub fn char_states(target: &str, input: &str) -> Vec<CharState> {
    let mut typed = input.chars();
    target
        .chars()
        .map(|expected| match typed.next() {
            None => CharState::Pending,
            Some(ch) if ch == expected => CharState::Correct,
            Some(_) => CharState::Incorrect,
        })
        .collect()
}

/// Cut `input` down to at most as many characters as `target` has.
pub fn clamp_input<'a>(input: &'a str, target: &str) -> &'a str {
    let limit = target.chars().count();
    match input.char_indices().nth(limit) {
        Some((byte_idx, _)) => &input[..byte_idx],
        None => input,
    }
}

pub fn calculate_metrics(target: &str, input: &str, duration_ms: u64) -> TypingMetrics {
    let capped = clamp_input(input, target);
    let correct = char_states(target, capped)
        .iter()
        .filter(|s| matches!(s, CharState::Correct))
        .count() as u32;
    let characters = capped.chars().count() as u32;
    let errors = characters.saturating_sub(correct);

    let accuracy = if characters == 0 {
        100
    } else {
        (correct as f64 / characters as f64 * 100.0).round() as u32
    };

    let minutes = (duration_ms as f64 / 60_000.0).max(MIN_MINUTES);
    let gross_wpm = ((characters as f64 / CHARS_PER_WORD) / minutes).round();
    let wpm = (gross_wpm * (accuracy as f64 / 100.0)).round().max(0.0) as u32;

    TypingMetrics {
        wpm,
        accuracy,
        correct,
        errors,
        duration_ms,
        characters,
    }
}
