use std::collections::HashSet;

use crate::session::metrics::{CharState, char_states};

/// Fold a raw key to the lowercase ASCII letter the learn drill scores,
/// or `None` for anything else.
pub fn normalize_letter(ch: char) -> Option<char> {
    ch.is_ascii_alphabetic().then(|| ch.to_ascii_lowercase())
}

/// Remembers which positions of the current attempt have already been
/// charged as typos. A position is charged at most once per attempt, even
/// if the user backspaces over it and gets it wrong again.
#[derive(Clone, Debug, Default)]
pub struct TypoTracker {
    penalized: HashSet<usize>,
}

impl TypoTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the positions that are incorrect in `input` and were not
    /// charged before, marking them as charged.
    pub fn new_typos(&mut self, target: &str, input: &str) -> Vec<usize> {
        char_states(target, input)
            .into_iter()
            .enumerate()
            .filter(|(_, state)| matches!(state, CharState::Incorrect))
            .filter_map(|(pos, _)| self.penalized.insert(pos).then_some(pos))
            .collect()
    }

    pub fn penalized_count(&self) -> usize {
        self.penalized.len()
    }

    pub fn clear(&mut self) {
        self.penalized.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_letter() {
        assert_eq!(normalize_letter('a'), Some('a'));
        assert_eq!(normalize_letter('Q'), Some('q'));
        assert_eq!(normalize_letter('1'), None);
        assert_eq!(normalize_letter(' '), None);
        assert_eq!(normalize_letter('é'), None);
    }

    #[test]
    fn test_wrong_position_charged_once() {
        let mut tracker = TypoTracker::new();
        assert_eq!(tracker.new_typos("abc", "x"), vec![0]);
        // Same wrong char still present on the next input event
        assert!(tracker.new_typos("abc", "xb").is_empty());
        assert_eq!(tracker.penalized_count(), 1);
    }

    #[test]
    fn test_backspace_and_retype_wrong_is_not_recharged() {
        let mut tracker = TypoTracker::new();
        assert_eq!(tracker.new_typos("abc", "ax"), vec![1]);
        // Backspace then a different wrong character at the same position
        assert!(tracker.new_typos("abc", "a").is_empty());
        assert!(tracker.new_typos("abc", "ay").is_empty());
        assert_eq!(tracker.penalized_count(), 1);
    }

    #[test]
    fn test_several_new_typos_in_one_event() {
        let mut tracker = TypoTracker::new();
        assert_eq!(tracker.new_typos("abcd", "xbyz"), vec![0, 2, 3]);
    }

    #[test]
    fn test_clear_starts_fresh_attempt() {
        let mut tracker = TypoTracker::new();
        tracker.new_typos("abc", "x");
        tracker.clear();
        assert_eq!(tracker.new_typos("abc", "x"), vec![0]);
    }
}
