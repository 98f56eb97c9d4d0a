use std::collections::{BTreeMap, VecDeque};
use std::sync::LazyLock;

use rand::Rng;

use crate::engine::learn::LearnDifficulty;

const HOME_ROW: &[char] = &['a', 's', 'd', 'f', 'j', 'k', 'l'];
const REACH_ROW: &[char] = &['r', 'e', 'i', 'o', 't', 'g', 'h'];
const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const COMMON_LETTERS: &[char] = &['e', 't', 'a', 'o', 'i', 'n', 's', 'h', 'r', 'd', 'l', 'u'];
pub const DIGRAPHS: &[&str] = &["th", "he", "in", "er", "an", "re", "on", "at", "en", "nd"];

const DIGRAPH_CHANCE: f64 = 0.5;

static BEGINNER_POOL: LazyLock<LetterPool> =
    LazyLock::new(|| LetterPool::from_tiers(&[(HOME_ROW, 6), (REACH_ROW, 2), (ALPHABET, 1)]));

static INTERMEDIATE_POOL: LazyLock<LetterPool> =
    LazyLock::new(|| LetterPool::from_tiers(&[(COMMON_LETTERS, 4), (ALPHABET, 1)]));

/// Letter frequency table. Weights from overlapping tiers are summed, so a
/// home-row letter in the beginner pool carries 6 + 1.
#[derive(Clone, Debug)]
pub struct LetterPool {
    entries: Vec<(char, u32)>,
    total: u32,
}

impl LetterPool {
    pub fn from_tiers(tiers: &[(&[char], u32)]) -> Self {
        let mut weights: BTreeMap<char, u32> = BTreeMap::new();
        for &(letters, weight) in tiers {
            for &ch in letters {
                *weights.entry(ch).or_default() += weight;
            }
        }
        let entries: Vec<(char, u32)> = weights.into_iter().filter(|&(_, w)| w > 0).collect();
        let total = entries.iter().map(|&(_, w)| w).sum();
        Self { entries, total }
    }

    pub fn weight(&self, ch: char) -> u32 {
        self.entries
            .iter()
            .find(|&&(c, _)| c == ch)
            .map(|&(_, w)| w)
            .unwrap_or(0)
    }

    pub fn total_weight(&self) -> u32 {
        self.total
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        if self.total == 0 {
            return 'a';
        }
        let mut roll = rng.gen_range(0..self.total);
        for &(ch, weight) in &self.entries {
            if roll < weight {
                return ch;
            }
            roll -= weight;
        }
        self.entries.last().map(|&(ch, _)| ch).unwrap_or('a')
    }
}

pub fn pool_for(difficulty: LearnDifficulty) -> &'static LetterPool {
    match difficulty {
        LearnDifficulty::Beginner => &*BEGINNER_POOL,
        LearnDifficulty::Intermediate | LearnDifficulty::Advanced => &*INTERMEDIATE_POOL,
    }
}

/// Next letter to show. Pending letters (the tail of a digraph) always come
/// first, in order.
pub fn next_target<R: Rng + ?Sized>(
    difficulty: LearnDifficulty,
    pending: &mut VecDeque<char>,
    rng: &mut R,
) -> char {
    if let Some(letter) = pending.pop_front() {
        return letter;
    }

    if difficulty == LearnDifficulty::Advanced && rng.gen_bool(DIGRAPH_CHANCE) {
        let digraph = DIGRAPHS[rng.gen_range(0..DIGRAPHS.len())];
        let mut letters = digraph.chars();
        if let Some(first) = letters.next() {
            pending.extend(letters);
            return first;
        }
    }

    pool_for(difficulty).pick(rng)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::rngs::mock::StepRng;

    use super::*;

    #[test]
    fn test_beginner_weights() {
        let pool = pool_for(LearnDifficulty::Beginner);
        assert_eq!(pool.weight('a'), 7);
        assert_eq!(pool.weight('e'), 3);
        assert_eq!(pool.weight('z'), 1);
        assert_eq!(pool.total_weight(), 7 * 6 + 7 * 2 + 26);
    }

    #[test]
    fn test_intermediate_weights() {
        let pool = pool_for(LearnDifficulty::Intermediate);
        assert_eq!(pool.weight('e'), 5);
        assert_eq!(pool.weight('q'), 1);
        assert_eq!(pool.total_weight(), 12 * 4 + 26);
    }

    #[test]
    fn test_pending_queue_is_fifo() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut pending: VecDeque<char> = VecDeque::from(vec!['x', 'y']);
        assert_eq!(next_target(LearnDifficulty::Beginner, &mut pending, &mut rng), 'x');
        assert_eq!(next_target(LearnDifficulty::Beginner, &mut pending, &mut rng), 'y');
        assert!(pending.is_empty());
    }

    #[test]
    fn test_fixed_sequence_picks_first_entry() {
        let mut rng = StepRng::new(0, 0);
        let mut pending = VecDeque::new();
        assert_eq!(next_target(LearnDifficulty::Beginner, &mut pending, &mut rng), 'a');
        assert_eq!(next_target(LearnDifficulty::Intermediate, &mut pending, &mut rng), 'a');
    }

    #[test]
    fn test_advanced_digraph_queues_second_letter() {
        let mut rng = StepRng::new(0, 0);
        let mut pending = VecDeque::new();
        assert_eq!(next_target(LearnDifficulty::Advanced, &mut pending, &mut rng), 't');
        assert_eq!(pending, VecDeque::from(vec!['h']));
        assert_eq!(next_target(LearnDifficulty::Advanced, &mut pending, &mut rng), 'h');
        assert!(pending.is_empty());
    }

    #[test]
    fn test_same_seed_same_draws() {
        let draw = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut pending = VecDeque::new();
            (0..50)
                .map(|_| next_target(LearnDifficulty::Advanced, &mut pending, &mut rng))
                .collect::<String>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_beginner_favors_home_row() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut pending = VecDeque::new();
        let mut counts: HashMap<char, usize> = HashMap::new();
        for _ in 0..10_000 {
            let ch = next_target(LearnDifficulty::Beginner, &mut pending, &mut rng);
            assert!(ch.is_ascii_lowercase());
            *counts.entry(ch).or_default() += 1;
        }
        let home = counts.get(&'f').copied().unwrap_or(0);
        let rare = counts.get(&'z').copied().unwrap_or(0);
        assert!(home > rare * 3, "home={home} rare={rare}");
    }

    #[test]
    fn test_digraph_tails_follow_heads() {
        let mut rng = SmallRng::seed_from_u64(99);
        let mut pending = VecDeque::new();
        for _ in 0..500 {
            let had_pending = !pending.is_empty();
            let ch = next_target(LearnDifficulty::Advanced, &mut pending, &mut rng);
            assert!(ch.is_ascii_lowercase());
            if had_pending {
                // A queued tail never queues anything itself
                assert!(pending.is_empty());
            }
        }
    }
}
